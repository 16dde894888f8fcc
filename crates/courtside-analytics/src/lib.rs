//! Match analytics over per-frame player and ball detections: gap filling, shot
//! detection, player selection, projection onto a reference court and per-player
//! statistics.

mod filter;
mod interpolate;
mod mini_court;
mod pipeline;
mod projector;
mod selection;
mod shots;
mod stats;

pub use filter::MovingAverage;
pub use interpolate::interpolate_track;
pub use mini_court::{CanvasRect, CourtScale, MiniCourtLayout, COURT_LINES};
pub use pipeline::{MatchAnalysis, MatchAnalyzer};
pub use projector::CourtProjector;
pub use selection::PlayerSelector;
pub use shots::ShotDetector;
pub use stats::{
    forward_fill, MatchStats, PlayerStats, PlayerStatsRecord, ShotSummary, StatsAggregator,
};
