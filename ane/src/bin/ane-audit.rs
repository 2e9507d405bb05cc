//! ane-audit - offline quality audits and negotiation simulations
//!
//! Usage:
//!   ane-audit audit --population 200 --seed 7
//!   ane-audit simulate --population 50 --config ane.yaml
//!
//! Both subcommands print JSON to stdout; logs go to stderr.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ane::audit::PopulationGenerator;
use ane::negotiation::{NegotiationRequest, StartOutcome};
use ane::{AneConfig, CompatibilityScorer, InMemoryLedger, NegotiationOrchestrator, QualityAuditor};
use profile::InMemoryProfileStore;

#[derive(Parser, Debug)]
#[command(name = "ane-audit")]
#[command(about = "Matching quality audits and negotiation simulations for Accord")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "ANE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit a synthetic population for forced matches and bias
    Audit(PopulationArgs),
    /// Negotiate each sampled actor with its best candidate
    Simulate(PopulationArgs),
}

#[derive(Args, Debug)]
struct PopulationArgs {
    /// Actors in the generated population
    #[arg(long, default_value = "100")]
    population: usize,

    /// Population seed (config value when unset)
    #[arg(long)]
    seed: Option<u64>,

    /// Actors sampled (whole population when unset)
    #[arg(long)]
    sample: Option<usize>,

    /// Concurrent evaluations (config value when unset)
    #[arg(long)]
    concurrency: Option<usize>,
}

impl PopulationArgs {
    fn apply(&self, config: &mut AneConfig) {
        if let Some(seed) = self.seed {
            config.auditor.seed = seed;
        }
        if let Some(sample) = self.sample {
            config.auditor.sample_size = Some(sample);
        }
        if let Some(concurrency) = self.concurrency {
            config.auditor.concurrency = concurrency;
            config.orchestrator.workers = Some(concurrency);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AneConfig> {
    match path {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            AneConfig::from_yaml(&yaml).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(AneConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    let log_level = cli.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ane={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Audit(args) => {
            args.apply(&mut config);
            config.validate()?;
            audit(config, args.population).await
        }
        Command::Simulate(args) => {
            args.apply(&mut config);
            config.validate()?;
            simulate(config, args.population).await
        }
    }
}

async fn audit(config: AneConfig, population: usize) -> anyhow::Result<()> {
    info!(engine_id = %config.general.engine_id, population, "Running quality audit");
    let report = QualityAuditor::from_config(&config)
        .run_synthetic(population)
        .await;
    println!("{}", report.to_json()?);
    Ok(())
}

async fn simulate(config: AneConfig, size: usize) -> anyhow::Result<()> {
    let population = PopulationGenerator::new(config.auditor.seed).generate(size);
    let sampled = config
        .auditor
        .sample_size
        .unwrap_or(population.len())
        .min(population.len());

    info!(engine_id = %config.general.engine_id, population = size, sampled, "Running negotiation simulation");

    let ledger = Arc::new(InMemoryLedger::with_max_events(config.general.ledger_capacity));
    let scorer = CompatibilityScorer::with_config(config.scorer.clone());
    let orchestrator = Arc::new(
        NegotiationOrchestrator::builder()
            .config(config)
            .profiles(Arc::new(InMemoryProfileStore::with_actors(population.clone())))
            .persistence(ledger.clone())
            .build()?,
    );

    let mut started = Vec::new();
    let mut not_started: BTreeMap<String, usize> = BTreeMap::new();
    for actor in population.iter().take(sampled) {
        let Some(best) = scorer.rank_candidates(actor, &population, 0.0).into_iter().next() else {
            continue;
        };
        let request = NegotiationRequest::new(actor.id.clone(), best.to.clone());
        match orchestrator.start_negotiation(request).await? {
            StartOutcome::Started(id) => started.push(id),
            StartOutcome::Rejected(reason) => {
                let key = serde_json::to_value(&reason)?
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                *not_started.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut pending = started.clone();
    while !pending.is_empty() {
        let mut next = Vec::new();
        for (id, result) in orchestrator.advance_many(pending).await {
            match result {
                Ok(snapshot) if !snapshot.status.is_terminal() => next.push(id),
                Ok(_) => {}
                Err(e) => warn!(negotiation_id = %id, error = %e, "Round failed"),
            }
        }
        pending = next;
    }
    orchestrator.flush_events().await;

    let mut outcomes: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total_rounds = 0u32;
    for id in &started {
        let snapshot = orchestrator.snapshot(id).await?;
        *outcomes.entry(snapshot.status.as_str()).or_insert(0) += 1;
        total_rounds += snapshot.round;
    }
    let average_rounds = if started.is_empty() {
        0.0
    } else {
        f64::from(total_rounds) / started.len() as f64
    };

    let summary = serde_json::json!({
        "population": size,
        "sampled": sampled,
        "started": started.len(),
        "not_started": not_started,
        "outcomes": outcomes,
        "average_rounds": average_rounds,
        "ledger": ledger.stats().await,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
