//! Route completion.
//!
//! Closing a route card writes one history record per stop, scores each stop
//! against the client's earlier routes, grants the points through the ledger
//! and checks the streak bonus.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::DispatchError;
use crate::fleet::FleetDirectory;
use crate::gamification::streak::local_day;
use crate::gamification::{GamificationError, GrantReason, PointLedger, ScoringEngine, StreakEvaluator};
use crate::routes::{RouteHistory, RouteLog};
use crate::storage::{CollectionStore, ScoringSettings};

/// A finished route handed over by the dispatch board.
#[derive(Debug, Clone)]
pub struct RouteCompletion {
    pub messenger_id: String,
    pub vehicle_id: String,
    /// Client ids, one per stop
    pub stops: Vec<String>,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    /// 0 when the dispatcher did not rate the route
    pub star_rating: u8,
    pub note: String,
    pub completed_by: String,
}

/// What a completion wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub history_ids: Vec<String>,
    /// Sum of the per-stop points
    pub route_points: i64,
    /// Streak bonus granted by this completion, 0 if none
    pub streak_bonus: i64,
    pub per_stop_minutes: u32,
    pub effective_rating: u8,
    /// The route was unrated and scored with the default rating
    pub defaulted_rating: bool,
}

impl CompletionOutcome {
    pub fn total_points(&self) -> i64 {
        self.route_points + self.streak_bonus
    }
}

/// Rating applied to unrated routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingPolicy {
    default_rating: u8,
}

impl RatingPolicy {
    pub fn new(default_rating: u8) -> Self {
        Self {
            default_rating: default_rating.clamp(1, 5),
        }
    }

    /// Rating to score with, and whether the default was applied.
    pub fn effective(&self, rating: u8) -> (u8, bool) {
        if rating == 0 {
            (self.default_rating, true)
        } else {
            (rating, false)
        }
    }
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Minutes attributed to each stop: whole route minutes split evenly.
pub fn per_stop_minutes(departure: DateTime<Utc>, arrival: DateTime<Utc>, stops: usize) -> u32 {
    if stops == 0 {
        return 0;
    }
    let total_minutes = ((arrival - departure).num_seconds().max(0) as f64 / 60.0).round();
    (total_minutes / stops as f64).round() as u32
}

/// Dispatcher's route completion workflow.
pub struct RouteCompletionService {
    fleet: FleetDirectory,
    engine: ScoringEngine,
    log: RouteLog,
    ledger: PointLedger,
    streak: StreakEvaluator,
    policy: RatingPolicy,
    offset: FixedOffset,
}

impl RouteCompletionService {
    pub fn new(store: Arc<dyn CollectionStore>, settings: &ScoringSettings) -> Result<Self, DispatchError> {
        settings.validate()?;
        let offset = settings.utc_offset()?;

        Ok(Self {
            fleet: FleetDirectory::new(Arc::clone(&store)),
            engine: ScoringEngine::new(Arc::clone(&store)),
            log: RouteLog::new(Arc::clone(&store)),
            ledger: PointLedger::new(Arc::clone(&store)),
            streak: StreakEvaluator::new(store, offset),
            policy: RatingPolicy::new(settings.default_rating),
            offset,
        })
    }

    /// Close a route: history, client stats, points and streak bonus.
    pub fn complete_route(&self, completion: &RouteCompletion) -> Result<CompletionOutcome, DispatchError> {
        if completion.star_rating > 5 {
            return Err(DispatchError::InvalidRating(completion.star_rating));
        }
        if completion.arrival < completion.departure {
            return Err(DispatchError::ArrivalBeforeDeparture);
        }

        let stops: Vec<&str> = completion
            .stops
            .iter()
            .map(|s| s.trim())
            .filter(|s| {
                if s.is_empty() {
                    tracing::warn!("Skipping stop without a client id");
                }
                !s.is_empty()
            })
            .collect();
        if stops.is_empty() {
            return Err(DispatchError::NoStops);
        }

        let messenger = self
            .fleet
            .messenger(&completion.messenger_id)?
            .ok_or_else(|| GamificationError::MessengerNotFound(completion.messenger_id.clone()))?;

        // Cached totals without ledger history become opening balances.
        self.ledger
            .adopt_opening_balances(std::slice::from_ref(&messenger))?;

        let vehicle_code = match self.fleet.vehicle(&completion.vehicle_id)? {
            Some(vehicle) => vehicle.code,
            None => {
                tracing::warn!("Vehicle {} not in the fleet directory", completion.vehicle_id);
                "Unknown".to_string()
            }
        };

        let (rating, defaulted_rating) = self.policy.effective(completion.star_rating);
        if defaulted_rating {
            tracing::info!(
                "Route of messenger {} closed unrated; scoring as {} stars",
                messenger.id,
                rating
            );
        }

        let minutes = per_stop_minutes(completion.departure, completion.arrival, completion.stops.len());
        let mut history_ids = Vec::with_capacity(stops.len());
        let mut route_points = 0;

        for client_id in stops {
            // Score against stats from earlier routes only.
            let points = self.engine.score(minutes as f64, rating, client_id)?.total();

            let record = RouteHistory {
                id: Uuid::new_v4().to_string(),
                messenger_id: messenger.id.clone(),
                messenger_name: messenger.full_name(),
                vehicle_id: completion.vehicle_id.clone(),
                vehicle_code: vehicle_code.clone(),
                client_id: client_id.to_string(),
                client_name: self.fleet.client_name(client_id)?,
                start_time: completion.departure,
                end_time: completion.arrival,
                duration: minutes,
                star_rating: rating,
                note: completion.note.clone(),
                points_earned: points,
                completed_by: completion.completed_by.clone(),
                completed_at: completion.arrival,
            };
            let history_id = self.log.save_route_history(&record)?;

            self.ledger.grant_at(
                &messenger.id,
                points,
                GrantReason::Route {
                    history_id: history_id.clone(),
                },
                completion.arrival,
            )?;

            history_ids.push(history_id);
            route_points += points;
        }

        let streak_bonus = self.grant_streak_bonus(&messenger.id, completion.arrival)?;
        let total = self.ledger.refresh_cached_points(&messenger.id)?;

        tracing::info!(
            "Completed route of {} ({} stops, {} min each): {:+} points, streak bonus {}, total {}",
            messenger.full_name(),
            history_ids.len(),
            minutes,
            route_points,
            streak_bonus,
            total
        );

        Ok(CompletionOutcome {
            history_ids,
            route_points,
            streak_bonus,
            per_stop_minutes: minutes,
            effective_rating: rating,
            defaulted_rating,
        })
    }

    /// Grant the streak bonus unless one was already granted inside the
    /// current window. Returns the amount granted.
    fn grant_streak_bonus(&self, messenger_id: &str, arrival: DateTime<Utc>) -> Result<i64, DispatchError> {
        let today = local_day(arrival, self.offset);
        let bonus = self.streak.check_streak_bonus_on(messenger_id, today)?;
        if bonus <= 0 {
            return Ok(0);
        }

        let Some(days) = self.streak.window_days()? else {
            return Ok(0);
        };
        let window_start = today - Duration::days(days as i64 - 1);
        if self
            .ledger
            .has_streak_bonus_since(messenger_id, window_start, self.offset)?
        {
            tracing::debug!(
                "Messenger {} already received a streak bonus since {}",
                messenger_id,
                window_start
            );
            return Ok(0);
        }

        self.ledger
            .grant_at(messenger_id, bonus, GrantReason::StreakBonus { days }, arrival)?;
        Ok(bonus)
    }
}
