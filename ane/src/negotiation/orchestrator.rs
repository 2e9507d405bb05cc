//! Negotiation orchestrator - drives pairs of actors through rounds.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex, MutexGuard, Semaphore};
use tracing::{debug, error, info, warn};

use profile::{ActorId, ProfileStore, Side, Terms};

use crate::config::{AneConfig, OrchestratorConfig};
use crate::counter::CounterOfferGenerator;
use crate::decision::DecisionAnalyzer;
use crate::ledger::{EventKind, InMemoryLedger, NegotiationEvent, Persistence};
use crate::proposal::opening_terms;
use crate::scoring::CompatibilityScorer;
use crate::similarity::{TextMatcher, TokenOverlapMatcher};
use crate::types::{
    ActionKind, Agreement, AneError, DecisionAnalysis, NegotiationContext, NegotiationId,
    NextStep, Result,
};

use super::record::{Negotiation, NegotiationSnapshot, RoundDecisions};
use super::registry::{PairKey, PairRegistry};
use super::state::{NegotiationStatus, TerminationReason};

/// Request to open a negotiation between two actors.
#[derive(Debug, Clone)]
pub struct NegotiationRequest {
    /// Initiating actor
    pub actor_a: ActorId,
    /// Counterpart
    pub actor_b: ActorId,
    /// Minimum forward compatibility (config default when unset)
    pub min_compatibility: Option<f64>,
    /// Round limit (config default when unset)
    pub max_rounds: Option<u32>,
    /// Absolute deadline (config default budget when unset)
    pub deadline: Option<DateTime<Utc>>,
}

impl NegotiationRequest {
    /// Request with default limits.
    pub fn new(actor_a: impl Into<ActorId>, actor_b: impl Into<ActorId>) -> Self {
        Self {
            actor_a: actor_a.into(),
            actor_b: actor_b.into(),
            min_compatibility: None,
            max_rounds: None,
            deadline: None,
        }
    }

    /// Override the compatibility threshold.
    pub fn with_min_compatibility(mut self, min: f64) -> Self {
        self.min_compatibility = Some(min);
        self
    }

    /// Override the round limit.
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Why a negotiation was not opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Both IDs name the same actor
    SameActor,
    /// Forward compatibility below the threshold
    BelowThreshold { score: f64, min: f64 },
    /// The pair already negotiates
    PairAlreadyActive { existing: NegotiationId },
}

/// Result of [`NegotiationOrchestrator::start_negotiation`].
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// Negotiation opened
    Started(NegotiationId),
    /// Pair not eligible
    Rejected(RejectionReason),
}

impl StartOutcome {
    /// ID of the opened negotiation, if any.
    pub fn id(&self) -> Option<&NegotiationId> {
        match self {
            StartOutcome::Started(id) => Some(id),
            StartOutcome::Rejected(_) => None,
        }
    }
}

enum LedgerMessage {
    Event(NegotiationEvent),
    Flush(oneshot::Sender<()>),
}

struct NegotiationHandle {
    state: Mutex<Negotiation>,
    cancelled: AtomicBool,
}

/// Coordinates negotiations between pairs of actors.
///
/// Each negotiation sits behind its own lock, so rounds of different
/// negotiations run in parallel while rounds of the same negotiation never
/// overlap. Ledger events are sent to a background task in order; only
/// agreement saves are awaited.
pub struct NegotiationOrchestrator {
    config: OrchestratorConfig,
    scorer: CompatibilityScorer,
    analyzer: DecisionAnalyzer,
    counter: CounterOfferGenerator,
    matcher: Arc<dyn TextMatcher>,
    profiles: Arc<dyn ProfileStore>,
    persistence: Arc<dyn Persistence>,
    active: DashMap<NegotiationId, Arc<NegotiationHandle>>,
    archive: DashMap<NegotiationId, NegotiationSnapshot>,
    pairs: PairRegistry,
    pair_agreements: DashMap<PairKey, u32>,
    events: mpsc::UnboundedSender<LedgerMessage>,
}

impl NegotiationOrchestrator {
    /// Create a builder.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Open a negotiation if the pair is eligible.
    pub async fn start_negotiation(&self, request: NegotiationRequest) -> Result<StartOutcome> {
        if request.actor_a == request.actor_b {
            info!(actor = %request.actor_a, "Negotiation refused: same actor on both sides");
            return Ok(StartOutcome::Rejected(RejectionReason::SameActor));
        }

        let min = request
            .min_compatibility
            .unwrap_or(self.config.min_compatibility);
        if !(0.0..=1.0).contains(&min) {
            return Err(AneError::InvalidInput(format!(
                "minimum compatibility must be within 0.0 - 1.0, got {}",
                min
            )));
        }
        let max_rounds = request.max_rounds.unwrap_or(self.config.max_rounds);
        if max_rounds == 0 {
            return Err(AneError::InvalidInput("max rounds must be at least 1".to_string()));
        }

        let now = Utc::now();
        let deadline = match request.deadline {
            Some(deadline) if deadline <= now => {
                return Err(AneError::InvalidInput(format!(
                    "deadline {} is not in the future",
                    deadline
                )))
            }
            Some(deadline) => deadline,
            None => now + chrono::Duration::seconds(self.config.default_deadline_secs as i64),
        };

        let (actor_a, actor_b) = tokio::try_join!(
            self.profiles.get_actor(&request.actor_a),
            self.profiles.get_actor(&request.actor_b)
        )?;
        actor_a.validate()?;
        actor_b.validate()?;

        let compatibility = self.scorer.score_pair(&actor_a, &actor_b);
        let score = compatibility.forward.score;
        if score < min {
            info!(
                actor_a = %actor_a.id,
                actor_b = %actor_b.id,
                score = score,
                min = min,
                "Negotiation refused: compatibility below threshold"
            );
            return Ok(StartOutcome::Rejected(RejectionReason::BelowThreshold { score, min }));
        }

        let id = NegotiationId::new();
        let key = PairKey::new(&actor_a.id, &actor_b.id);
        if let Err(existing) = self.pairs.try_reserve(key, id.clone()).await {
            info!(
                actor_a = %actor_a.id,
                actor_b = %actor_b.id,
                existing = %existing,
                "Negotiation refused: pair already negotiating"
            );
            return Ok(StartOutcome::Rejected(RejectionReason::PairAlreadyActive { existing }));
        }

        info!(
            negotiation_id = %id,
            actor_a = %actor_a.id,
            actor_b = %actor_b.id,
            compatibility = score,
            max_rounds = max_rounds,
            "Negotiation started"
        );

        let negotiation = Negotiation::new(
            id.clone(),
            Arc::new(actor_a),
            Arc::new(actor_b),
            compatibility,
            max_rounds,
            now,
            deadline,
        );
        self.active.insert(
            id.clone(),
            Arc::new(NegotiationHandle {
                state: Mutex::new(negotiation),
                cancelled: AtomicBool::new(false),
            }),
        );
        self.record(&id, EventKind::Created { compatibility: score });

        Ok(StartOutcome::Started(id))
    }

    /// Put caller-supplied opening terms on the table.
    pub async fn propose(&self, id: &NegotiationId, terms: Terms) -> Result<NegotiationSnapshot> {
        if terms.is_empty() {
            return Err(AneError::InvalidInput("proposal has no terms".to_string()));
        }
        let handle = self.handle(id)?;
        let mut negotiation = self.lock(&handle, id).await?;
        if negotiation.status != NegotiationStatus::Initiated {
            return Err(AneError::InvalidStateTransition {
                id: id.to_string(),
                from: negotiation.status.to_string(),
                to: NegotiationStatus::Proposed.to_string(),
            });
        }
        self.open(&mut negotiation, terms)?;
        Ok(negotiation.snapshot())
    }

    /// Run one step of the negotiation.
    pub async fn advance_round(&self, id: &NegotiationId) -> Result<NegotiationSnapshot> {
        let handle = self.handle(id)?;
        let mut negotiation = self.lock(&handle, id).await?;
        if negotiation.status.is_terminal() {
            return Err(AneError::InvalidStateTransition {
                id: id.to_string(),
                from: negotiation.status.to_string(),
                to: "next round".to_string(),
            });
        }

        let now = Utc::now();
        if handle.cancelled.load(Ordering::SeqCst) {
            self.terminate(&mut negotiation, NegotiationStatus::Rejected, TerminationReason::Cancelled)?;
        } else if negotiation.deadline_ratio(now) >= 1.0 {
            self.terminate(&mut negotiation, NegotiationStatus::Expired, TerminationReason::Expired)?;
        } else {
            match negotiation.status {
                NegotiationStatus::Initiated => {
                    let terms = opening_terms(
                        &negotiation.actor_a,
                        &negotiation.actor_b,
                        self.matcher.as_ref(),
                    );
                    if terms.is_empty() {
                        self.terminate(
                            &mut negotiation,
                            NegotiationStatus::Rejected,
                            TerminationReason::NothingToExchange,
                        )?;
                    } else {
                        self.open(&mut negotiation, terms)?;
                    }
                }
                NegotiationStatus::Proposed => self.evaluate_round(&mut negotiation, now).await?,
                NegotiationStatus::Countered => {
                    self.transition(&mut negotiation, NegotiationStatus::Proposed)?;
                }
                _ => {}
            }
        }

        let snapshot = negotiation.snapshot();
        if snapshot.status.is_terminal() {
            self.retire(&negotiation, snapshot.clone()).await;
        }
        Ok(snapshot)
    }

    /// Advance until the negotiation is terminal.
    pub async fn run_to_completion(&self, id: &NegotiationId) -> Result<NegotiationSnapshot> {
        loop {
            let snapshot = self.advance_round(id).await?;
            if snapshot.status.is_terminal() {
                return Ok(snapshot);
            }
        }
    }

    /// Advance several negotiations in parallel, one round each.
    ///
    /// Results keep the order of `ids`.
    pub async fn advance_many(
        self: &Arc<Self>,
        ids: Vec<NegotiationId>,
    ) -> Vec<(NegotiationId, Result<NegotiationSnapshot>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.worker_count()));
        let mut tasks = Vec::with_capacity(ids.len());

        for id in ids {
            let this = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let task_id = id.clone();
            let task = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| AneError::Internal("worker pool closed".to_string()))?;
                this.advance_round(&task_id).await
            });
            tasks.push((id, task));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (id, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    error!(negotiation_id = %id, error = %e, "Round task failed");
                    Err(AneError::Internal(format!("round task failed: {}", e)))
                }
            };
            results.push((id, result));
        }
        results
    }

    /// Request cancellation; honored at the next round boundary.
    pub fn cancel(&self, id: &NegotiationId) -> Result<()> {
        let handle = self.handle(id)?;
        handle.cancelled.store(true, Ordering::SeqCst);
        info!(negotiation_id = %id, "Negotiation cancellation requested");
        Ok(())
    }

    /// Current view of a live or archived negotiation.
    pub async fn snapshot(&self, id: &NegotiationId) -> Result<NegotiationSnapshot> {
        if let Some(snapshot) = self.archive.get(id) {
            return Ok(snapshot.value().clone());
        }
        let handle = self.handle(id)?;
        let negotiation = self.lock(&handle, id).await?;
        Ok(negotiation.snapshot())
    }

    /// IDs of live negotiations, sorted.
    pub fn active_negotiations(&self) -> Vec<NegotiationId> {
        let mut ids: Vec<NegotiationId> = self.active.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Wait until every event recorded so far has reached persistence.
    pub async fn flush_events(&self) {
        let (tx, rx) = oneshot::channel();
        if self.events.send(LedgerMessage::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    fn handle(&self, id: &NegotiationId) -> Result<Arc<NegotiationHandle>> {
        if let Some(handle) = self.active.get(id) {
            return Ok(Arc::clone(handle.value()));
        }
        match self.archive.get(id) {
            Some(snapshot) => Err(AneError::InvalidStateTransition {
                id: id.to_string(),
                from: snapshot.status.to_string(),
                to: "any".to_string(),
            }),
            None => Err(AneError::NotFound(format!("negotiation {}", id))),
        }
    }

    async fn lock<'a>(
        &self,
        handle: &'a NegotiationHandle,
        id: &NegotiationId,
    ) -> Result<MutexGuard<'a, Negotiation>> {
        if let Ok(guard) = handle.state.try_lock() {
            return Ok(guard);
        }
        let wait = Duration::from_millis(self.config.lock_timeout_ms);
        match tokio::time::timeout(wait, handle.state.lock()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!(negotiation_id = %id, "Negotiation busy in another round");
                Err(AneError::Conflict(format!("negotiation {} is busy", id)))
            }
        }
    }

    fn record(&self, id: &NegotiationId, kind: EventKind) {
        let event = NegotiationEvent::new(id.clone(), kind);
        if self.events.send(LedgerMessage::Event(event)).is_err() {
            warn!(negotiation_id = %id, "Ledger task stopped, event dropped");
        }
    }

    fn transition(&self, negotiation: &mut Negotiation, to: NegotiationStatus) -> Result<()> {
        let change = negotiation.transition(to)?;
        debug!(
            negotiation_id = %negotiation.id,
            from = change.from.as_str(),
            to = change.to.as_str(),
            "Negotiation transition"
        );
        self.record(
            &negotiation.id,
            EventKind::StateTransition {
                from: change.from,
                to: change.to,
            },
        );
        Ok(())
    }

    fn terminate(
        &self,
        negotiation: &mut Negotiation,
        to: NegotiationStatus,
        reason: TerminationReason,
    ) -> Result<()> {
        self.transition(negotiation, to)?;
        negotiation.termination = Some(reason);
        negotiation.completed_at = Some(Utc::now());
        info!(
            negotiation_id = %negotiation.id,
            status = to.as_str(),
            reason = ?reason,
            round = negotiation.round,
            "Negotiation finished"
        );
        Ok(())
    }

    fn open(&self, negotiation: &mut Negotiation, terms: Terms) -> Result<()> {
        self.transition(negotiation, NegotiationStatus::Proposed)?;
        negotiation.round = 1;
        negotiation.proposals.push(terms.clone());
        self.record(&negotiation.id, EventKind::ProposalIssued { round: 1, terms });
        Ok(())
    }

    async fn context(
        &self,
        negotiation: &Negotiation,
        side: Side,
        deadline_ratio: f64,
        prior_agreements: u32,
    ) -> NegotiationContext {
        let actor = match side {
            Side::A => &negotiation.actor_a.id,
            Side::B => &negotiation.actor_b.id,
        };
        let others = self.pairs.count_for(actor).await.saturating_sub(1);
        let earlier = negotiation.proposals.len().saturating_sub(1);

        NegotiationContext {
            side,
            round: negotiation.round,
            prior_proposals: negotiation.proposals[..earlier].to_vec(),
            deadline_ratio: Some(deadline_ratio),
            competitive_alternatives: others as u32,
            prior_agreements,
        }
    }

    async fn evaluate_round(&self, negotiation: &mut Negotiation, now: DateTime<Utc>) -> Result<()> {
        let terms = negotiation
            .current_terms()
            .cloned()
            .ok_or_else(|| AneError::Internal(format!("negotiation {} has no proposal", negotiation.id)))?;
        let round = negotiation.round;
        let ratio = negotiation.deadline_ratio(now);
        let key = PairKey::new(&negotiation.actor_a.id, &negotiation.actor_b.id);
        let prior = self.pair_agreements.get(&key).map(|c| *c.value()).unwrap_or(0);

        let ctx_a = self.context(negotiation, Side::A, ratio, prior).await;
        let ctx_b = self.context(negotiation, Side::B, ratio, prior).await;
        let analysis_a =
            self.analyzer
                .evaluate(&negotiation.actor_a, &negotiation.actor_b, &terms, &ctx_a)?;
        let analysis_b =
            self.analyzer
                .evaluate(&negotiation.actor_b, &negotiation.actor_a, &terms, &ctx_b)?;

        for (side, analysis) in [(Side::A, &analysis_a), (Side::B, &analysis_b)] {
            self.record(
                &negotiation.id,
                EventKind::DecisionRendered {
                    side,
                    actor: analysis.actor_id.clone(),
                    overall: analysis.overall,
                    accept: analysis.accept,
                    recommendation: analysis.recommendation,
                },
            );
        }
        negotiation.decisions.push(RoundDecisions {
            round,
            a: analysis_a.clone(),
            b: analysis_b.clone(),
        });

        debug!(
            negotiation_id = %negotiation.id,
            round = round,
            score_a = analysis_a.overall,
            score_b = analysis_b.overall,
            accept_a = analysis_a.accept,
            accept_b = analysis_b.accept,
            "Round evaluated"
        );

        if analysis_a.accept && analysis_b.accept {
            return self
                .conclude(negotiation, key, terms, &analysis_a, &analysis_b, now)
                .await;
        }

        let rejecting = [(Side::A, &analysis_a), (Side::B, &analysis_b)]
            .into_iter()
            .find(|(_, a)| a.recommendation == ActionKind::Reject)
            .map(|(side, _)| side);
        if let Some(side) = rejecting {
            return self.terminate(
                negotiation,
                NegotiationStatus::Rejected,
                TerminationReason::RejectedBy(side),
            );
        }

        self.transition(negotiation, NegotiationStatus::Countered)?;
        let mut next = terms.clone();
        if !analysis_a.accept {
            next = self
                .counter
                .counter_offer(&negotiation.actor_a, &next, Side::A, &analysis_a);
        }
        if !analysis_b.accept {
            next = self
                .counter
                .counter_offer(&negotiation.actor_b, &next, Side::B, &analysis_b);
        }
        // unchanged terms would be evaluated the same way again
        if next == terms {
            return self.terminate(
                negotiation,
                NegotiationStatus::Rejected,
                TerminationReason::Stalemate,
            );
        }

        negotiation.round += 1;
        if negotiation.round > negotiation.max_rounds {
            return self.terminate(
                negotiation,
                NegotiationStatus::Rejected,
                TerminationReason::RoundLimitExceeded,
            );
        }

        negotiation.proposals.push(next.clone());
        self.transition(negotiation, NegotiationStatus::Proposed)?;
        self.record(
            &negotiation.id,
            EventKind::ProposalIssued {
                round: negotiation.round,
                terms: next,
            },
        );
        Ok(())
    }

    async fn conclude(
        &self,
        negotiation: &mut Negotiation,
        key: PairKey,
        terms: Terms,
        analysis_a: &DecisionAnalysis,
        analysis_b: &DecisionAnalysis,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let agreement = Agreement {
            id: uuid::Uuid::new_v4().to_string(),
            negotiation_id: negotiation.id.clone(),
            actor_a: negotiation.actor_a.id.clone(),
            actor_b: negotiation.actor_b.id.clone(),
            next_steps: next_steps(&terms, &negotiation.actor_a.id, &negotiation.actor_b.id),
            terms,
            compatibility: negotiation.compatibility.forward.score,
            score_a: analysis_a.overall,
            score_b: analysis_b.overall,
            round: negotiation.round,
            created_at: now,
        };

        self.terminate(negotiation, NegotiationStatus::Agreed, TerminationReason::MutualAccept)?;
        *self.pair_agreements.entry(key).or_insert(0) += 1;

        if let Err(e) = self.persistence.save_agreement(&agreement).await {
            error!(
                negotiation_id = %negotiation.id,
                agreement_id = %agreement.id,
                error = %e,
                "Failed to save agreement"
            );
        }
        self.record(
            &negotiation.id,
            EventKind::AgreementReached {
                agreement_id: agreement.id.clone(),
            },
        );
        negotiation.agreement = Some(agreement);
        Ok(())
    }

    async fn retire(&self, negotiation: &Negotiation, snapshot: NegotiationSnapshot) {
        let key = PairKey::new(&negotiation.actor_a.id, &negotiation.actor_b.id);
        self.archive.insert(negotiation.id.clone(), snapshot);
        self.active.remove(&negotiation.id);
        self.pairs.release(&key, &negotiation.id).await;
    }
}

/// Follow-up actions implied by agreed terms.
fn next_steps(terms: &Terms, actor_a: &ActorId, actor_b: &ActorId) -> Vec<NextStep> {
    let mut steps = vec![NextStep {
        description: "Kickoff meeting to confirm scope and owners".to_string(),
        owner: actor_a.clone(),
        due_in_days: 7,
    }];

    for metric in &terms.success_metrics {
        steps.push(NextStep {
            description: format!("Set up tracking for: {}", metric),
            owner: actor_a.clone(),
            due_in_days: 14,
        });
    }
    for condition in &terms.conditions {
        steps.push(NextStep {
            description: format!("Confirm condition: {}", condition),
            owner: actor_b.clone(),
            due_in_days: 14,
        });
    }
    if let Some(timeline) = &terms.timeline {
        steps.push(NextStep {
            description: format!("Milestone review: {}", timeline.description),
            owner: actor_a.clone(),
            due_in_days: timeline.duration_days.unwrap_or(30),
        });
    }
    steps
}

/// Builder for the orchestrator.
pub struct OrchestratorBuilder {
    config: AneConfig,
    profiles: Option<Arc<dyn ProfileStore>>,
    persistence: Option<Arc<dyn Persistence>>,
    matcher: Option<Arc<dyn TextMatcher>>,
}

impl OrchestratorBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: AneConfig::default(),
            profiles: None,
            persistence: None,
            matcher: None,
        }
    }

    /// Use a full configuration.
    pub fn config(mut self, config: AneConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the profile store (required).
    pub fn profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Set persistence (defaults to an in-memory ledger).
    pub fn persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Set the text similarity strategy.
    pub fn matcher(mut self, matcher: Arc<dyn TextMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Set the round limit.
    pub fn max_rounds(mut self, rounds: u32) -> Self {
        self.config.orchestrator.max_rounds = rounds;
        self
    }

    /// Set the compatibility threshold.
    pub fn min_compatibility(mut self, min: f64) -> Self {
        self.config.orchestrator.min_compatibility = min;
        self
    }

    /// Build the orchestrator.
    ///
    /// Must be called within a Tokio runtime; the ledger task is spawned here.
    pub fn build(self) -> Result<NegotiationOrchestrator> {
        self.config.validate()?;
        let profiles = self
            .profiles
            .ok_or_else(|| AneError::ConfigError("profile store is required".to_string()))?;
        let persistence = self.persistence.unwrap_or_else(|| {
            Arc::new(InMemoryLedger::with_max_events(self.config.general.ledger_capacity))
        });
        let matcher = self
            .matcher
            .unwrap_or_else(|| Arc::new(TokenOverlapMatcher::new()));

        let events = spawn_ledger_task(Arc::clone(&persistence));

        info!(
            engine_id = %self.config.general.engine_id,
            matcher = matcher.name(),
            max_rounds = self.config.orchestrator.max_rounds,
            "Negotiation orchestrator ready"
        );

        Ok(NegotiationOrchestrator {
            scorer: CompatibilityScorer::with_config(self.config.scorer.clone())
                .with_matcher(Arc::clone(&matcher)),
            analyzer: DecisionAnalyzer::with_config(self.config.analyzer.clone())
                .with_matcher(Arc::clone(&matcher)),
            counter: CounterOfferGenerator::with_config(self.config.counter.clone())
                .with_matcher(Arc::clone(&matcher)),
            config: self.config.orchestrator,
            matcher,
            profiles,
            persistence,
            active: DashMap::new(),
            archive: DashMap::new(),
            pairs: PairRegistry::new(),
            pair_agreements: DashMap::new(),
            events,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_ledger_task(persistence: Arc<dyn Persistence>) -> mpsc::UnboundedSender<LedgerMessage> {
    let (tx, mut rx) = mpsc::unbounded_channel::<LedgerMessage>();
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message {
                LedgerMessage::Event(event) => {
                    if let Err(e) = persistence.append_event(&event).await {
                        warn!(
                            negotiation_id = %event.negotiation_id,
                            error = %e,
                            "Failed to persist negotiation event"
                        );
                    }
                }
                LedgerMessage::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    });
    tx
}
