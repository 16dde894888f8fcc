mod bbox;
mod detections;
mod error;
mod keypoints;
mod series;
mod settings;
mod track_id;

pub use bbox::*;
pub use detections::*;
pub use error::*;
pub use keypoints::*;
pub use series::*;
pub use settings::*;
pub use track_id::*;

/// A point or offset in a 2D pixel space (source frame or reference canvas).
pub type Vector2 = nalgebra::Vector2<f64>;

/// 0-based index of a video frame. Frames are dense, so this is also the unit of time.
pub type FrameIndex = usize;
