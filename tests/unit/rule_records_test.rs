//! Unit tests for loading stored rule records.

use std::sync::Arc;

use logitrack::gamification::{GamificationRule, RuleKind, RuleTable};
use logitrack::storage::{names, CollectionStore, MemoryStore};
use serde_json::json;

#[test]
fn test_legacy_records_convert_to_tagged_kinds() {
    let store: Arc<dyn CollectionStore> = Arc::new(MemoryStore::new());
    store
        .set(
            names::GAMIFICATION_RULES,
            &[
                json!({"id": "rule-time-fast", "name": "Fast", "type": "time_based", "threshold": 25,
                       "enabled": true, "pointsAwarded": 60, "pointsDeducted": 0, "description": ""}),
                json!({"id": "rule-time-slow", "name": "Slow", "type": "time_based", "threshold": -15,
                       "enabled": true, "pointsAwarded": 0, "pointsDeducted": 25, "description": ""}),
                json!({"id": "rule-star-4", "name": "Four", "type": "star_rating", "threshold": 4,
                       "enabled": false, "pointsAwarded": 20, "pointsDeducted": 0, "description": ""}),
                json!({"id": "rule-streak", "name": "Streak", "type": "streak", "threshold": 5,
                       "enabled": true, "pointsAwarded": 80, "pointsDeducted": 0, "description": ""}),
                json!({"id": "rule-odd", "name": "Odd", "type": "time_based",
                       "enabled": true, "pointsAwarded": 5, "pointsDeducted": 0, "description": ""}),
            ],
        )
        .unwrap();

    let rules = RuleTable::new(Arc::clone(&store)).get_rules().unwrap();
    let kinds: Vec<_> = rules.iter().map(|r| (r.id.as_str(), r.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("rule-time-fast", RuleKind::FastThreshold { pct: 25.0 }),
            ("rule-time-slow", RuleKind::SlowThreshold { pct: 15.0 }),
            ("rule-star-4", RuleKind::StarExact { stars: 4 }),
            ("rule-streak", RuleKind::Streak { days: 5, min_stars: 4 }),
            ("rule-odd", RuleKind::Custom),
        ]
    );
    assert!(!rules[2].enabled);
}

#[test]
fn test_rules_written_in_flat_form() {
    let store: Arc<dyn CollectionStore> = Arc::new(MemoryStore::new());
    RuleTable::new(Arc::clone(&store)).get_rules().unwrap();

    let raw = store.get(names::GAMIFICATION_RULES).unwrap();
    assert_eq!(raw.len(), 9);

    let streak = raw
        .iter()
        .find(|v| v["id"] == "rule-streak")
        .unwrap();
    assert_eq!(streak["type"], "streak");
    assert_eq!(streak["threshold"], 7.0);
    assert_eq!(streak["minStars"], 4);
    assert_eq!(streak["pointsAwarded"], 100);

    let reloaded: GamificationRule = serde_json::from_value(streak.clone()).unwrap();
    assert_eq!(reloaded.kind, RuleKind::Streak { days: 7, min_stars: 4 });
}
