//! Dispatch board route card.
//!
//! A card tracks one outgoing route: who drives, which stops it covers and
//! the stopwatch between departure and arrival.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::completion::RouteCompletion;
use super::DispatchError;

/// Stopwatch state of a route card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    /// Not yet departed
    Pending,
    /// On the road
    Running { departure: DateTime<Utc> },
    /// Back at base
    Arrived {
        departure: DateTime<Utc>,
        arrival: DateTime<Utc>,
    },
}

impl CardState {
    pub fn name(&self) -> &'static str {
        match self {
            CardState::Pending => "pending",
            CardState::Running { .. } => "running",
            CardState::Arrived { .. } => "arrived",
        }
    }
}

/// One route on the dispatch board.
#[derive(Debug, Clone)]
pub struct DispatchCard {
    pub id: String,
    pub messenger_id: String,
    pub vehicle_id: String,
    /// Client ids, one per stop
    pub stops: Vec<String>,
    pub note: String,
    /// 0 while unrated, otherwise 1-5
    star_rating: u8,
    state: CardState,
}

impl DispatchCard {
    pub fn new(messenger_id: &str, vehicle_id: &str, stops: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messenger_id: messenger_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            stops,
            note: String::new(),
            star_rating: 0,
            state: CardState::Pending,
        }
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn star_rating(&self) -> u8 {
        self.star_rating
    }

    /// Rate the route. 0 clears the rating.
    pub fn set_rating(&mut self, rating: u8) -> Result<(), DispatchError> {
        if rating > 5 {
            return Err(DispatchError::InvalidRating(rating));
        }
        self.star_rating = rating;
        Ok(())
    }

    /// Start the stopwatch.
    pub fn depart(&mut self, now: DateTime<Utc>) -> Result<(), DispatchError> {
        match self.state {
            CardState::Pending => {
                if self.stops.is_empty() {
                    return Err(DispatchError::NoStops);
                }
                self.state = CardState::Running { departure: now };
                Ok(())
            }
            other => Err(DispatchError::InvalidTransition {
                from: other.name(),
                action: "depart",
            }),
        }
    }

    /// Stop the stopwatch.
    pub fn arrive(&mut self, now: DateTime<Utc>) -> Result<(), DispatchError> {
        match self.state {
            CardState::Running { departure } => {
                if now < departure {
                    return Err(DispatchError::ArrivalBeforeDeparture);
                }
                self.state = CardState::Arrived {
                    departure,
                    arrival: now,
                };
                Ok(())
            }
            other => Err(DispatchError::InvalidTransition {
                from: other.name(),
                action: "arrive",
            }),
        }
    }

    /// Time on the road so far. Zero before departure, frozen after arrival.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        match self.state {
            CardState::Pending => Duration::zero(),
            CardState::Running { departure } => (now - departure).max(Duration::zero()),
            CardState::Arrived { departure, arrival } => arrival - departure,
        }
    }

    /// Turn an arrived card into a completion request.
    pub fn into_completion(self, completed_by: &str) -> Result<RouteCompletion, DispatchError> {
        match self.state {
            CardState::Arrived { departure, arrival } => Ok(RouteCompletion {
                messenger_id: self.messenger_id,
                vehicle_id: self.vehicle_id,
                stops: self.stops,
                departure,
                arrival,
                star_rating: self.star_rating,
                note: self.note,
                completed_by: completed_by.to_string(),
            }),
            other => Err(DispatchError::InvalidTransition {
                from: other.name(),
                action: "complete",
            }),
        }
    }
}

/// Format an elapsed duration as `HH:MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
