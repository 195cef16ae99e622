mod common;

use std::sync::Arc;

use common::{config, neighbour_model, write_all, write_snapshot, CountingProducer, FailingProducer};
use mulehunter_graph::Transaction;
use mulehunter_runtime::{RiskService, Verdict};

fn ready_service() -> (RiskService, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_all(&config.asset_paths);
    let service = RiskService::new(&config, Arc::new(FailingProducer::default()));
    service.ensure_ready().unwrap();
    (service, dir)
}

#[test]
fn test_large_transfer_to_unknown_account() {
    let (service, _dir) = ready_service();

    let to_unknown = service
        .score(&Transaction::new("A", "D", 100_000.0))
        .unwrap();
    assert_eq!(to_unknown.node_id, "A");
    assert_eq!(to_unknown.out_degree, 3);
    assert_eq!(to_unknown.population_size, 4);
    assert_eq!(to_unknown.linked_accounts, vec!["Acct_B", "Acct_C"]);
    assert!(!to_unknown.source_cold_start);
    assert!(to_unknown.target_cold_start);
    assert_eq!(to_unknown.risk_ratio, 1.5);
    assert_eq!(to_unknown.risk_score, 0.6225);
    assert_eq!(to_unknown.verdict, Verdict::Suspicious);

    let small_known = service.score(&Transaction::new("A", "B", 10.0)).unwrap();
    assert_eq!(small_known.out_degree, 3);
    assert_eq!(small_known.population_size, 3);
    assert_eq!(small_known.risk_score, 0.3775);
    assert_eq!(small_known.verdict, Verdict::Safe);

    assert!(to_unknown.risk_score > small_known.risk_score);
}

#[test]
fn test_critical_source() {
    let (service, _dir) = ready_service();
    let response = service
        .score(&Transaction::new("C", "A", 50_000.0))
        .unwrap();
    assert_eq!(response.risk_score, 0.9241);
    assert_eq!(response.verdict, Verdict::Critical);
    assert!(response.ja3_detected);
    assert_eq!(response.unsupervised_score, 0.8241);
    assert!(response.linked_accounts.is_empty());
    assert_eq!(response.out_degree, 1);
    assert_eq!(response.model_version, "MuleSAGE-5Feat");
}

#[test]
fn test_identical_requests_identical_scores() {
    let (service, _dir) = ready_service();
    let tx = Transaction::new("B", "Q", 12_345.0);
    let first = service.score(&tx).unwrap();
    let second = service.score(&tx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cold_start_rows_never_leak() {
    let (service, _dir) = ready_service();
    for i in 0..25 {
        let tx = Transaction::new(format!("new-src-{}", i), format!("new-dst-{}", i), 500.0);
        service.score(&tx).unwrap();
    }

    let (_, assets) = service.lifecycle().current();
    let assets = assets.unwrap();
    assert_eq!(assets.snapshot.node_count(), 3);
    assert_eq!(assets.snapshot.edge_count(), 2);
    assert_eq!(assets.ids.len(), 3);
    assert_eq!(assets.ids.index_of("new-src-0"), None);
    assert_eq!(service.health().nodes_count, 3);
}

#[test]
fn test_both_endpoints_unknown() {
    let (service, _dir) = ready_service();
    let response = service.score(&Transaction::new("X", "Y", 750.0)).unwrap();
    assert!(response.source_cold_start);
    assert!(response.target_cold_start);
    assert_eq!(response.population_size, 5);
    assert_eq!(response.out_degree, 1);
    assert!(response.linked_accounts.is_empty());
    assert!(matches!(response.verdict, Verdict::Safe | Verdict::Suspicious));
    assert_eq!(response.verdict, Verdict::Safe);
}

#[test]
fn test_self_transfer_unknown_shares_slot() {
    let (service, _dir) = ready_service();
    let response = service.score(&Transaction::new("Z", "Z", 1.0)).unwrap();
    assert_eq!(response.population_size, 4);
    assert_eq!(response.out_degree, 1);
}

#[test]
fn test_score_bootstraps_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let producer = Arc::new(CountingProducer::default());
    let service = RiskService::new(&config(dir.path()), producer.clone());

    let response = service.score(&Transaction::new("A", "B", 10.0)).unwrap();
    assert_eq!(response.risk_score, 0.3775);
    assert_eq!(producer.generated(), 1);
}

#[test]
fn test_concurrent_scoring_agrees() {
    let (service, _dir) = ready_service();
    let service = Arc::new(service);
    let expected = service
        .score(&Transaction::new("A", "D", 100_000.0))
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                // Interleave unrelated cold-start traffic with the checked request.
                service
                    .score(&Transaction::new(format!("noise-{}", i), "A", 20_000.0))
                    .unwrap();
                service
                    .score(&Transaction::new("A", "D", 100_000.0))
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

fn neighbour_service() -> (RiskService, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_snapshot(&config.asset_paths);
    neighbour_model()
        .to_state_dict()
        .save(&config.asset_paths.model_file)
        .unwrap();
    let service = RiskService::new(&config, Arc::new(FailingProducer::default()));
    service.ensure_ready().unwrap();
    (service, dir)
}

#[test]
fn test_score_follows_in_neighbours() {
    let (service, _dir) = neighbour_service();

    // A has no in-edges: logit -2.5.
    let isolated = service.score(&Transaction::new("A", "X", 10.0)).unwrap();
    assert_eq!(isolated.risk_score, 0.0759);

    // B and C are each fed only by A (ratio 1.0): logit -0.5.
    let fed_by_a = service.score(&Transaction::new("B", "X", 10.0)).unwrap();
    assert_eq!(fed_by_a.risk_score, 0.3775);
    let also_fed_by_a = service.score(&Transaction::new("C", "X", 10.0)).unwrap();
    assert_eq!(also_fed_by_a.risk_score, 0.3775);

    // A large transfer boosts A's own ratio, which only its successors see.
    let boosted = service.score(&Transaction::new("A", "X", 50_000.0)).unwrap();
    assert_eq!(boosted.risk_score, 0.0759);
}

#[test]
fn test_transaction_edge_reaches_scored_node() {
    let (service, _dir) = neighbour_service();

    // The self-transfer edge B→B adds B (ratio 0.5) to its own in-neighbours:
    // mean(1.0, 0.5) = 0.75, logit -1.0.
    let self_transfer = service.score(&Transaction::new("B", "B", 10.0)).unwrap();
    assert_eq!(self_transfer.risk_score, 0.2689);

    // A→A makes A its own only in-neighbour: logit 2 * 1.0 - 2.5.
    let loop_on_a = service.score(&Transaction::new("A", "A", 10.0)).unwrap();
    assert_eq!(loop_on_a.risk_score, 0.3775);

    // An unknown self-transfer sees the cold-start ratio 1.0.
    let cold_loop = service.score(&Transaction::new("Q", "Q", 10.0)).unwrap();
    assert_eq!(cold_loop.risk_score, 0.3775);
    let cold_source = service.score(&Transaction::new("Q", "A", 10.0)).unwrap();
    assert_eq!(cold_source.risk_score, 0.0759);
}
