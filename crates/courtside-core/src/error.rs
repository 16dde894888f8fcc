use thiserror::Error;

/// Contract violations that make the analytics output meaningless.
///
/// Missing data (no ball, a single player, no shots) is not an error: it degrades to
/// empty or zero-valued outputs instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("expected {expected} court keypoint coordinates, found {found}")]
    KeypointCount { expected: usize, found: usize },
    #[error("court keypoint {index} has a non-finite coordinate")]
    NonFiniteKeypoint { index: usize },
    #[error("court keypoint {index} yields an unusable pixel-per-meter calibration ({value})")]
    DegenerateCalibration { index: usize, value: f64 },
    #[error("ball track covers {ball} frames but player tracks cover {players}")]
    FrameCountMismatch { ball: usize, players: usize },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
