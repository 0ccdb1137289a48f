//! Scoring rule definitions.
//!
//! A rule's behaviour is carried by an explicit `RuleKind` variant. On disk
//! rules are flat records (`type` + `threshold`), which keeps the collection
//! readable by older dispatch boards; the legacy `time_based` and
//! `star_rating` encodings are converted when loaded.

use serde::{Deserialize, Serialize};

/// Minimum rating a day needs to count towards a streak when not configured.
pub const DEFAULT_STREAK_MIN_STARS: u8 = 4;

/// What a rule measures and how its threshold is interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleKind {
    /// Fires when a stop is at least `pct` percent faster than the client average.
    FastThreshold { pct: f64 },
    /// Fires when a stop is at least `pct` percent slower than the client average.
    SlowThreshold { pct: f64 },
    /// Fires when the stop's rating equals `stars`.
    StarExact { stars: u8 },
    /// Flat award for every completed stop.
    Volume,
    /// Flat bonus for `days` consecutive days with a rating of at least `min_stars`.
    Streak { days: u32, min_stars: u8 },
    /// Admin-defined rule the engine does not evaluate.
    Custom,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::FastThreshold { .. } => "fast_threshold",
            RuleKind::SlowThreshold { .. } => "slow_threshold",
            RuleKind::StarExact { .. } => "star_exact",
            RuleKind::Volume => "volume",
            RuleKind::Streak { .. } => "streak",
            RuleKind::Custom => "custom",
        }
    }

    /// Threshold value as stored on disk.
    pub fn threshold(&self) -> Option<f64> {
        match self {
            RuleKind::FastThreshold { pct } | RuleKind::SlowThreshold { pct } => Some(*pct),
            RuleKind::StarExact { stars } => Some(*stars as f64),
            RuleKind::Streak { days, .. } => Some(*days as f64),
            RuleKind::Volume | RuleKind::Custom => None,
        }
    }

    /// Same kind with a new threshold.
    pub fn with_threshold(&self, threshold: f64) -> Result<Self, String> {
        if !threshold.is_finite() {
            return Err(format!("threshold must be a finite number, got {}", threshold));
        }

        match self {
            RuleKind::FastThreshold { .. } | RuleKind::SlowThreshold { .. } => {
                let pct = threshold.abs();
                if pct == 0.0 {
                    return Err("time threshold must be non-zero".to_string());
                }
                Ok(match self {
                    RuleKind::FastThreshold { .. } => RuleKind::FastThreshold { pct },
                    _ => RuleKind::SlowThreshold { pct },
                })
            }
            RuleKind::StarExact { .. } => {
                let stars = whole_number(threshold)
                    .filter(|s| (1..=5).contains(s))
                    .ok_or_else(|| format!("star threshold must be 1-5, got {}", threshold))?;
                Ok(RuleKind::StarExact { stars: stars as u8 })
            }
            RuleKind::Streak { min_stars, .. } => {
                let days = whole_number(threshold)
                    .filter(|d| *d >= 1)
                    .ok_or_else(|| format!("streak length must be at least 1 day, got {}", threshold))?;
                Ok(RuleKind::Streak {
                    days: days as u32,
                    min_stars: *min_stars,
                })
            }
            RuleKind::Volume | RuleKind::Custom => {
                Err(format!("{} rules take no threshold", self.as_str()))
            }
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::FastThreshold { pct } => write!(f, "{}% faster than average", pct),
            RuleKind::SlowThreshold { pct } => write!(f, "{}% slower than average", pct),
            RuleKind::StarExact { stars } => write!(f, "{}-star rating", stars),
            RuleKind::Volume => write!(f, "per completed stop"),
            RuleKind::Streak { days, min_stars } => {
                write!(f, "{} consecutive days at {}+ stars", days, min_stars)
            }
            RuleKind::Custom => write!(f, "custom"),
        }
    }
}

fn whole_number(value: f64) -> Option<u32> {
    if value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

/// A configurable scoring rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleRecord", into = "RuleRecord")]
pub struct GamificationRule {
    pub id: String,
    pub name: String,
    pub kind: RuleKind,
    pub enabled: bool,
    pub points_awarded: i64,
    pub points_deducted: i64,
    pub description: String,
}

impl GamificationRule {
    pub fn new(id: &str, name: &str, kind: RuleKind, awarded: i64, deducted: i64, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            enabled: true,
            points_awarded: awarded,
            points_deducted: deducted,
            description: description.to_string(),
        }
    }

    /// Net effect when the rule fires on a star match.
    pub fn net_points(&self) -> i64 {
        self.points_awarded - self.points_deducted
    }
}

/// Flat on-disk representation of a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    rule_type: String,
    #[serde(default = "enabled_default")]
    enabled: bool,
    #[serde(default)]
    points_awarded: i64,
    #[serde(default)]
    points_deducted: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_stars: Option<u8>,
    #[serde(default)]
    description: String,
}

fn enabled_default() -> bool {
    true
}

impl From<RuleRecord> for GamificationRule {
    fn from(record: RuleRecord) -> Self {
        let kind = kind_from_record(&record).unwrap_or_else(|| {
            tracing::warn!(
                "Rule '{}' has type '{}' with threshold {:?}; treating it as custom",
                record.id,
                record.rule_type,
                record.threshold
            );
            RuleKind::Custom
        });

        Self {
            id: record.id,
            name: record.name,
            kind,
            enabled: record.enabled,
            points_awarded: record.points_awarded,
            points_deducted: record.points_deducted,
            description: record.description,
        }
    }
}

impl From<GamificationRule> for RuleRecord {
    fn from(rule: GamificationRule) -> Self {
        let min_stars = match rule.kind {
            RuleKind::Streak { min_stars, .. } => Some(min_stars),
            _ => None,
        };

        Self {
            threshold: rule.kind.threshold(),
            rule_type: rule.kind.as_str().to_string(),
            min_stars,
            id: rule.id,
            name: rule.name,
            enabled: rule.enabled,
            points_awarded: rule.points_awarded,
            points_deducted: rule.points_deducted,
            description: rule.description,
        }
    }
}

fn kind_from_record(record: &RuleRecord) -> Option<RuleKind> {
    let threshold = record.threshold;
    let min_stars = record.min_stars.unwrap_or(DEFAULT_STREAK_MIN_STARS);

    match record.rule_type.as_str() {
        // Legacy encoding: the threshold sign selects fast (+) or slow (-).
        "time_based" => match threshold {
            Some(t) if t > 0.0 => Some(RuleKind::FastThreshold { pct: t }),
            Some(t) if t < 0.0 => Some(RuleKind::SlowThreshold { pct: -t }),
            _ => None,
        },
        "fast_threshold" => threshold
            .filter(|t| *t != 0.0)
            .map(|t| RuleKind::FastThreshold { pct: t.abs() }),
        "slow_threshold" => threshold
            .filter(|t| *t != 0.0)
            .map(|t| RuleKind::SlowThreshold { pct: t.abs() }),
        "star_rating" | "star_exact" => threshold
            .and_then(whole_number)
            .filter(|s| *s <= u8::MAX as u32)
            .map(|s| RuleKind::StarExact { stars: s as u8 }),
        "volume" => Some(RuleKind::Volume),
        "streak" => threshold.and_then(whole_number).map(|days| RuleKind::Streak {
            days,
            min_stars,
        }),
        "custom" => Some(RuleKind::Custom),
        _ => None,
    }
}

/// Partial update applied by the rules admin screen.
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    pub enabled: Option<bool>,
    pub points_awarded: Option<i64>,
    pub points_deducted: Option<i64>,
    pub threshold: Option<f64>,
    pub description: Option<String>,
}

/// The rule set seeded on first access and restored by a reset.
pub fn default_rules() -> Vec<GamificationRule> {
    vec![
        GamificationRule::new(
            "rule-time-fast",
            "Fast Delivery",
            RuleKind::FastThreshold { pct: 20.0 },
            50,
            0,
            "+50 points when a stop is 20% faster than the client's average",
        ),
        GamificationRule::new(
            "rule-time-slow",
            "Slow Delivery",
            RuleKind::SlowThreshold { pct: 20.0 },
            0,
            30,
            "-30 points when a stop is 20% slower than the client's average",
        ),
        GamificationRule::new(
            "rule-star-5",
            "5-Star Rating",
            RuleKind::StarExact { stars: 5 },
            40,
            0,
            "+40 points for a 5-star rating",
        ),
        GamificationRule::new(
            "rule-star-4",
            "4-Star Rating",
            RuleKind::StarExact { stars: 4 },
            20,
            0,
            "+20 points for a 4-star rating",
        ),
        GamificationRule::new(
            "rule-star-3",
            "3-Star Rating",
            RuleKind::StarExact { stars: 3 },
            0,
            0,
            "0 points for a 3-star rating",
        ),
        GamificationRule::new(
            "rule-star-2",
            "2-Star Rating",
            RuleKind::StarExact { stars: 2 },
            0,
            20,
            "-20 points for a 2-star rating",
        ),
        GamificationRule::new(
            "rule-star-1",
            "1-Star Rating",
            RuleKind::StarExact { stars: 1 },
            0,
            40,
            "-40 points for a 1-star rating",
        ),
        GamificationRule::new(
            "rule-volume",
            "Completed Stop",
            RuleKind::Volume,
            10,
            0,
            "+10 points for every completed stop",
        ),
        GamificationRule::new(
            "rule-streak",
            "Perfect Week",
            RuleKind::Streak {
                days: 7,
                min_stars: DEFAULT_STREAK_MIN_STARS,
            },
            100,
            0,
            "+100 points for 7 consecutive days rated 4 stars or more",
        ),
    ]
}
