//! Data models for oddsacquire.

mod audit;
mod extraction;
mod game_reference;
mod historical;
mod odds;

pub use audit::{AuditLogEntry, PipelineRun, RunStatus};
pub use extraction::{WeekExtractionResult, YearBatchEntry, YearExtractionResult};
pub use game_reference::{GameIdError, GameReference, BOXSCORE_BASE_URL, MIN_GAME_ID_LEN};
pub use historical::{CoveredBy, HistoricalGameRow};
pub use odds::OddsSnapshot;
