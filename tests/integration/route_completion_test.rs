//! Integration tests for closing routes from the dispatch board.
//!
//! Covers the full path: card stopwatch, per-stop history, client stats,
//! ledger grants, the streak bonus and the leaderboard.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use logitrack::dispatch::{DispatchCard, RouteCompletion, RouteCompletionService};
use logitrack::fleet::{Client, FleetDirectory, Messenger, Vehicle};
use logitrack::gamification::{GrantReason, PointLedger, RankingView};
use logitrack::routes::{ClientStatsAggregator, HistoryFilter, RouteLog};
use logitrack::storage::{CollectionStore, MemoryStore, ScoringSettings};

struct Depot {
    store: Arc<dyn CollectionStore>,
    service: RouteCompletionService,
    messengers: Vec<Messenger>,
    vehicle: Vehicle,
    clients: Vec<Client>,
}

fn depot_with(settings: ScoringSettings) -> Depot {
    let store: Arc<dyn CollectionStore> = Arc::new(MemoryStore::new());
    let fleet = FleetDirectory::new(Arc::clone(&store));

    let messengers = vec![
        Messenger::new("Carlos", "Jiménez"),
        Messenger::new("María", "Santos"),
    ];
    let vehicle = Vehicle::new("MOTO-11");
    let clients = vec![
        Client::new("Supermercado Bravo"),
        Client::new("Notaría Féliz"),
        Client::new("Hospital Plaza"),
    ];

    for m in &messengers {
        fleet.upsert_messenger(m).unwrap();
    }
    fleet.upsert_vehicle(&vehicle).unwrap();
    for c in &clients {
        fleet.upsert_client(c).unwrap();
    }

    let service = RouteCompletionService::new(Arc::clone(&store), &settings).unwrap();
    Depot {
        store,
        service,
        messengers,
        vehicle,
        clients,
    }
}

fn depot() -> Depot {
    depot_with(ScoringSettings::default())
}

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap() + Duration::days(n)
}

fn route(depot: &Depot, messenger: usize, stops: &[usize], departure: DateTime<Utc>, minutes: i64, rating: u8) -> RouteCompletion {
    RouteCompletion {
        messenger_id: depot.messengers[messenger].id.clone(),
        vehicle_id: depot.vehicle.id.clone(),
        stops: stops.iter().map(|i| depot.clients[*i].id.clone()).collect(),
        departure,
        arrival: departure + Duration::minutes(minutes),
        star_rating: rating,
        note: "Entregar en recepción".to_string(),
        completed_by: "dispatcher".to_string(),
    }
}

#[test]
fn test_three_stop_route_splits_time_evenly() {
    let depot = depot();
    let outcome = depot
        .service
        .complete_route(&route(&depot, 0, &[0, 1, 2], day(0), 60, 4))
        .unwrap();

    assert_eq!(outcome.history_ids.len(), 3);
    assert_eq!(outcome.per_stop_minutes, 20);
    // First visit to every client: volume + four stars per stop.
    assert_eq!(outcome.route_points, 90);
    assert!(!outcome.defaulted_rating);

    let history = RouteLog::new(Arc::clone(&depot.store))
        .route_history(&HistoryFilter::default())
        .unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|r| r.duration == 20 && r.star_rating == 4));
    assert!(history.iter().all(|r| r.messenger_name == "Carlos Jiménez"));

    let stats = ClientStatsAggregator::new(Arc::clone(&depot.store))
        .all_stats()
        .unwrap();
    assert_eq!(stats.len(), 3);
    assert!(stats.iter().all(|s| s.total_routes == 1 && s.average_duration == 20.0));

    let ledger = PointLedger::new(Arc::clone(&depot.store));
    assert_eq!(ledger.total_for(&depot.messengers[0].id).unwrap(), 90);
    assert_eq!(ledger.grants().unwrap().len(), 3);
}

#[test]
fn test_unrated_route_uses_default_rating() {
    let depot = depot();
    let outcome = depot
        .service
        .complete_route(&route(&depot, 0, &[0], day(0), 30, 0))
        .unwrap();

    assert!(outcome.defaulted_rating);
    assert_eq!(outcome.effective_rating, 3);
    assert_eq!(outcome.route_points, 10);

    let history = RouteLog::new(Arc::clone(&depot.store))
        .route_history(&HistoryFilter::default())
        .unwrap();
    assert_eq!(history[0].star_rating, 3);
}

#[test]
fn test_configured_default_rating() {
    let depot = depot_with(ScoringSettings {
        default_rating: 5,
        utc_offset_minutes: 0,
    });
    let outcome = depot
        .service
        .complete_route(&route(&depot, 0, &[0], day(0), 30, 0))
        .unwrap();
    assert_eq!(outcome.effective_rating, 5);
    assert_eq!(outcome.route_points, 50);
}

#[test]
fn test_streak_bonus_granted_once_per_window() {
    let depot = depot();
    let mut bonus_days = Vec::new();

    for n in 0..14 {
        let outcome = depot
            .service
            .complete_route(&route(&depot, 0, &[0], day(n), 25, 5))
            .unwrap();
        if outcome.streak_bonus > 0 {
            bonus_days.push(n);
        }

        // A second route the same day never pays the bonus again.
        let again = depot
            .service
            .complete_route(&route(&depot, 0, &[1], day(n) + Duration::hours(2), 25, 5))
            .unwrap();
        assert_eq!(again.streak_bonus, 0);
    }

    assert_eq!(bonus_days, vec![6, 13]);

    let ledger = PointLedger::new(Arc::clone(&depot.store));
    let bonuses = ledger
        .grants_for(&depot.messengers[0].id)
        .unwrap()
        .into_iter()
        .filter(|g| matches!(g.reason, GrantReason::StreakBonus { days: 7 }))
        .count();
    assert_eq!(bonuses, 2);
}

#[test]
fn test_low_rated_day_breaks_the_streak() {
    let depot = depot();

    for n in 0..7 {
        let rating = if n == 3 { 3 } else { 5 };
        let outcome = depot
            .service
            .complete_route(&route(&depot, 0, &[0], day(n), 25, rating))
            .unwrap();
        assert_eq!(outcome.streak_bonus, 0);
    }
}

#[test]
fn test_cached_points_and_ranking_follow_the_ledger() {
    let depot = depot();

    // Seed a 20 minute average, then beat it by 40% with five stars.
    depot
        .service
        .complete_route(&route(&depot, 1, &[2], day(0), 20, 3))
        .unwrap();
    let fast = depot
        .service
        .complete_route(&route(&depot, 0, &[2], day(1), 12, 5))
        .unwrap();
    assert_eq!(fast.route_points, 100);

    let fleet = FleetDirectory::new(Arc::clone(&depot.store));
    assert_eq!(fleet.messenger(&depot.messengers[0].id).unwrap().unwrap().points, 100);
    assert_eq!(fleet.messenger(&depot.messengers[1].id).unwrap().unwrap().points, 10);

    let ranking = RankingView::new(Arc::clone(&depot.store))
        .messenger_ranking()
        .unwrap();
    assert_eq!(ranking[0].name, "Carlos Jiménez");
    assert_eq!(ranking[0].points, 100);
    assert_eq!(ranking[1].rank, 2);
}

#[test]
fn test_card_to_completion() {
    let depot = depot();
    let mut card = DispatchCard::new(
        &depot.messengers[1].id,
        &depot.vehicle.id,
        vec![depot.clients[0].id.clone(), depot.clients[1].id.clone()],
    );
    card.set_rating(4).unwrap();
    card.depart(day(0)).unwrap();
    card.arrive(day(0) + Duration::minutes(45) + Duration::seconds(20)).unwrap();

    let outcome = depot
        .service
        .complete_route(&card.into_completion("dispatcher").unwrap())
        .unwrap();

    // 45 whole minutes over two stops rounds to 23 each.
    assert_eq!(outcome.per_stop_minutes, 23);
    assert_eq!(outcome.history_ids.len(), 2);
}
