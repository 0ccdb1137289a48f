//! Unit tests for the messenger leaderboard.

use std::collections::HashMap;
use std::sync::Arc;

use logitrack::fleet::{FleetDirectory, Messenger};
use logitrack::gamification::ranking::rank_messengers;
use logitrack::gamification::{GrantReason, PointLedger, RankingView};
use logitrack::storage::{CollectionStore, MemoryStore};

fn messenger(id: &str, first: &str, last: &str) -> Messenger {
    let mut m = Messenger::new(first, last);
    m.id = id.to_string();
    m
}

#[test]
fn test_ties_ordered_by_name() {
    let messengers = vec![
        messenger("m1", "Zoila", "Reyes"),
        messenger("m2", "Andrés", "Polanco"),
    ];
    let totals: HashMap<String, i64> =
        [("m1".to_string(), 75), ("m2".to_string(), 75)].into_iter().collect();

    let ranking = rank_messengers(&messengers, &totals);
    assert_eq!(ranking[0].name, "Andrés Polanco");
    assert_eq!(ranking[0].rank, 1);
    assert_eq!(ranking[1].rank, 1);
}

#[test]
fn test_negative_totals_rank_below_zero() {
    let messengers = vec![
        messenger("m1", "Ana", "Díaz"),
        messenger("m2", "Luis", "Mejía"),
        messenger("m3", "Rosa", "Tavárez"),
    ];
    let totals: HashMap<String, i64> =
        [("m1".to_string(), -20), ("m3".to_string(), 5)].into_iter().collect();

    let order: Vec<_> = rank_messengers(&messengers, &totals)
        .into_iter()
        .map(|r| (r.messenger_id, r.points, r.rank))
        .collect();
    assert_eq!(
        order,
        vec![
            ("m3".to_string(), 5, 1),
            ("m2".to_string(), 0, 2),
            ("m1".to_string(), -20, 3),
        ]
    );
}

#[test]
fn test_ranking_reads_ledger_not_cache() {
    let store: Arc<dyn CollectionStore> = Arc::new(MemoryStore::new());
    let fleet = FleetDirectory::new(Arc::clone(&store));
    let ledger = PointLedger::new(Arc::clone(&store));

    let a = messenger("m1", "Ana", "Díaz");
    let b = messenger("m2", "Luis", "Mejía");
    fleet.upsert_messenger(&a).unwrap();
    fleet.upsert_messenger(&b).unwrap();

    ledger
        .grant("m2", 40, GrantReason::Route { history_id: "h1".into() })
        .unwrap();
    // Stale cache on m1 must not matter once m1 has ledger history.
    ledger
        .grant("m1", 10, GrantReason::Route { history_id: "h2".into() })
        .unwrap();
    fleet.set_cached_points("m1", 999).unwrap();

    let ranking = RankingView::new(store).messenger_ranking().unwrap();
    assert_eq!(ranking[0].messenger_id, "m2");
    assert_eq!(ranking[0].points, 40);
    assert_eq!(ranking[1].points, 10);
}
