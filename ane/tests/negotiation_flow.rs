//! End-to-end negotiation flows through the public API.

use std::sync::Arc;

use chrono::Utc;
use tokio_test::assert_ok;

use ane::audit::{classify_match, ForcedReason, PopulationGenerator};
use ane::config::AuditorConfig;
use ane::ledger::EventKind;
use ane::negotiation::{
    NegotiationRequest, NegotiationStatus, RejectionReason, StartOutcome, TerminationReason,
};
use ane::scoring::{MatchReason, ReasonKind};
use ane::{AneConfig, AneError, InMemoryLedger, NegotiationId, NegotiationOrchestrator};
use profile::{Actor, Capacity, InMemoryProfileStore, Need, Offering, Priority, Urgency};

fn founder() -> Actor {
    Actor::new("founder", "Founder Co", "fintech")
        .with_skill("payments")
        .with_need(Need::new("capital", "seed funding", Priority::Critical, Urgency::Weeks))
        .with_offering(
            Offering::new("engineering", "payments integration").with_capacity(Capacity::High),
        )
}

fn investor() -> Actor {
    Actor::new("investor", "Angel Fund", "fintech")
        .with_skill("payments")
        .with_offering(Offering::new("capital", "seed funding"))
        .with_need(Need::new("deals", "payments integration", Priority::High, Urgency::Flexible))
}

fn orchestrator_with(
    actors: Vec<Actor>,
    config: AneConfig,
    ledger: Arc<InMemoryLedger>,
) -> Arc<NegotiationOrchestrator> {
    Arc::new(
        NegotiationOrchestrator::builder()
            .config(config)
            .profiles(Arc::new(InMemoryProfileStore::with_actors(actors)))
            .persistence(ledger)
            .build()
            .unwrap(),
    )
}

fn started(outcome: StartOutcome) -> NegotiationId {
    match outcome {
        StartOutcome::Started(id) => id,
        StartOutcome::Rejected(reason) => panic!("negotiation not started: {:?}", reason),
    }
}

#[tokio::test]
async fn funding_pair_reaches_agreement() {
    let ledger = Arc::new(InMemoryLedger::new());
    let orch = orchestrator_with(vec![founder(), investor()], AneConfig::default(), ledger.clone());

    let id = started(
        orch.start_negotiation(NegotiationRequest::new("founder", "investor"))
            .await
            .unwrap(),
    );
    let done = orch.run_to_completion(&id).await.unwrap();

    assert_eq!(done.status, NegotiationStatus::Agreed);
    assert!(done.round <= done.max_rounds);
    let agreement = done.agreement.unwrap();
    assert!(agreement.terms.a_gives.contains(&"payments integration".to_string()));
    assert!(agreement.terms.b_gives.contains(&"seed funding".to_string()));
    assert!(agreement.score_a >= 0.5 && agreement.score_b >= 0.5);

    orch.flush_events().await;
    let stats = ledger.stats().await;
    assert_eq!(stats.created, 1);
    assert_eq!(stats.agreed, 1);
    assert_eq!(stats.agreements, 1);
}

#[tokio::test]
async fn one_live_negotiation_per_pair() {
    let orch = orchestrator_with(
        vec![founder(), investor()],
        AneConfig::default(),
        Arc::new(InMemoryLedger::new()),
    );

    let first = started(
        orch.start_negotiation(NegotiationRequest::new("founder", "investor"))
            .await
            .unwrap(),
    );
    let reversed = orch
        .start_negotiation(NegotiationRequest::new("investor", "founder"))
        .await
        .unwrap();
    assert_eq!(
        reversed,
        StartOutcome::Rejected(RejectionReason::PairAlreadyActive {
            existing: first.clone()
        })
    );

    assert_ok!(orch.run_to_completion(&first).await);
    let again = orch
        .start_negotiation(NegotiationRequest::new("investor", "founder"))
        .await
        .unwrap();
    assert!(matches!(again, StartOutcome::Started(_)));
}

#[tokio::test]
async fn deadline_expires_negotiation() {
    let orch = orchestrator_with(
        vec![founder(), investor()],
        AneConfig::default(),
        Arc::new(InMemoryLedger::new()),
    );

    let request = NegotiationRequest::new("founder", "investor")
        .with_deadline(Utc::now() + chrono::Duration::milliseconds(200));
    let id = started(orch.start_negotiation(request).await.unwrap());

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    let expired = orch.advance_round(&id).await.unwrap();
    assert_eq!(expired.status, NegotiationStatus::Expired);
    assert_eq!(expired.termination, Some(TerminationReason::Expired));
    assert!(expired.agreement.is_none());

    assert!(matches!(
        orch.advance_round(&id).await,
        Err(AneError::InvalidStateTransition { .. })
    ));
}

#[tokio::test]
async fn synthetic_negotiations_respect_round_cap() {
    let population = PopulationGenerator::new(11).generate(40);
    let mut config = AneConfig::default();
    config.orchestrator.max_rounds = 2;
    config.orchestrator.min_compatibility = 0.0;
    let ledger = Arc::new(InMemoryLedger::new());
    let orch = orchestrator_with(population.clone(), config, ledger.clone());

    let mut ids = Vec::new();
    for pair in population.chunks(2) {
        let outcome = orch
            .start_negotiation(NegotiationRequest::new(pair[0].id.clone(), pair[1].id.clone()))
            .await
            .unwrap();
        ids.push(started(outcome));
    }
    assert_eq!(orch.active_negotiations().len(), 20);

    let mut pending = ids.clone();
    while !pending.is_empty() {
        let results = orch.advance_many(pending.clone()).await;
        let order: Vec<NegotiationId> = results.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(order, pending);

        pending = results
            .into_iter()
            .filter_map(|(id, result)| {
                let snapshot = result.unwrap();
                assert!(snapshot.round <= snapshot.max_rounds + 1);
                assert!(snapshot.proposals.len() as u32 <= snapshot.max_rounds);
                (!snapshot.status.is_terminal()).then_some(id)
            })
            .collect();
    }

    assert!(orch.active_negotiations().is_empty());
    for id in &ids {
        let snapshot = orch.snapshot(id).await.unwrap();
        assert!(snapshot.status.is_terminal());
        assert!(snapshot.round <= 3);
        if snapshot.termination == Some(TerminationReason::RoundLimitExceeded) {
            assert_eq!(snapshot.round, 3);
            assert_eq!(snapshot.proposals.len(), 2);
        }
        assert_eq!(
            snapshot.agreement.is_some(),
            snapshot.status == NegotiationStatus::Agreed
        );
    }

    orch.flush_events().await;
    let stats = ledger.stats().await;
    assert_eq!(stats.created, 20);
    assert_eq!(stats.agreed + stats.rejected + stats.expired, 20);
}

#[tokio::test]
async fn ledger_records_lifecycle_in_order() {
    let ledger = Arc::new(InMemoryLedger::new());
    let orch = orchestrator_with(vec![founder(), investor()], AneConfig::default(), ledger.clone());

    let id = started(
        orch.start_negotiation(NegotiationRequest::new("founder", "investor"))
            .await
            .unwrap(),
    );
    assert_ok!(orch.run_to_completion(&id).await);
    orch.flush_events().await;

    let events = ledger.events_for(&id).await;
    assert!(matches!(events.first().map(|e| &e.kind), Some(EventKind::Created { .. })));
    assert!(matches!(
        events.last().map(|e| &e.kind),
        Some(EventKind::AgreementReached { .. })
    ));
    let decisions = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::DecisionRendered { .. }))
        .count();
    assert_eq!(decisions % 2, 0);
    assert!(decisions >= 2);
}

#[test]
fn low_compatibility_high_score_is_forced() {
    let reasons = vec![MatchReason {
        kind: ReasonKind::ComplementaryNeed,
        detail: "seed funding".to_string(),
    }];
    assert_eq!(
        classify_match(0.35, 0.75, &reasons, &AuditorConfig::default()),
        Some(ForcedReason::LowCompatibility)
    );
}
