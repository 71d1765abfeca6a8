//! Live odds snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time odds snapshot from a single sportsbook page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsSnapshot {
    pub sportsbook: String,
    pub sport: String,
    pub team1: String,
    pub team2: String,
    pub spread: Option<f64>,
    pub moneyline: Option<f64>,
    pub over_under: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}
