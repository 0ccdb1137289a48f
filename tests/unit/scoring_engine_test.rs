//! Unit tests for route scoring against the stored rule table.

use std::sync::Arc;

use logitrack::gamification::{RuleTable, RuleUpdate, ScoringEngine};
use logitrack::routes::ClientStatsAggregator;
use logitrack::storage::{CollectionStore, MemoryStore};

fn store_with_average(client_id: &str, durations: &[f64]) -> Arc<dyn CollectionStore> {
    let store: Arc<dyn CollectionStore> = Arc::new(MemoryStore::new());
    let stats = ClientStatsAggregator::new(Arc::clone(&store));
    for d in durations {
        stats.update_client_route_stats(client_id, *d).unwrap();
    }
    store
}

#[test]
fn test_fast_five_star_stop_scores_100() {
    let store = store_with_average("c1", &[20.0]);
    let engine = ScoringEngine::new(store);
    assert_eq!(engine.calculate_route_points(12.0, 5, "c1").unwrap(), 100);
}

#[test]
fn test_unknown_client_gets_no_time_rules() {
    let store = store_with_average("c1", &[20.0]);
    let engine = ScoringEngine::new(store);
    // Volume + four stars, no fast bonus without history.
    assert_eq!(engine.calculate_route_points(1.0, 4, "c2").unwrap(), 30);
}

#[test]
fn test_slow_one_star_stop_is_negative() {
    let store = store_with_average("c1", &[20.0, 20.0]);
    let engine = ScoringEngine::new(store);
    // 10 - 40 - 30
    assert_eq!(engine.calculate_route_points(30.0, 1, "c1").unwrap(), -60);
}

#[test]
fn test_rule_edits_change_the_score() {
    let store = store_with_average("c1", &[20.0]);
    let rules = RuleTable::new(Arc::clone(&store));
    let engine = ScoringEngine::new(Arc::clone(&store));

    rules.set_enabled("rule-volume", false).unwrap();
    rules
        .update_rule(
            "rule-time-fast",
            RuleUpdate {
                threshold: Some(50.0),
                ..Default::default()
            },
        )
        .unwrap();

    // 40% faster no longer clears a 50% threshold.
    assert_eq!(engine.calculate_route_points(12.0, 5, "c1").unwrap(), 40);

    rules.reset_rules().unwrap();
    assert_eq!(engine.calculate_route_points(12.0, 5, "c1").unwrap(), 100);
}

#[test]
fn test_breakdown_reports_percentage() {
    let store = store_with_average("c1", &[10.0, 30.0]);
    let engine = ScoringEngine::new(store);

    let breakdown = engine.score(25.0, 3, "c1").unwrap();
    assert_eq!(breakdown.percentage_diff, Some(25.0));
    let ids: Vec<_> = breakdown
        .contributions
        .iter()
        .map(|c| (c.rule_id.as_str(), c.delta))
        .collect();
    assert_eq!(
        ids,
        vec![("rule-volume", 10), ("rule-star-3", 0), ("rule-time-slow", -30)]
    );
}
