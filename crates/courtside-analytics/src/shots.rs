use courtside_core::{BoundingBox, FrameIndex, ShotSettings};

use crate::filter::MovingAverage;

/// Vertical travel direction of the ball in image space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    /// Towards the bottom of the frame (`y` increasing)
    Down,
    /// Towards the top of the frame (`y` decreasing)
    Up,
}

impl Direction {
    fn of(delta: f64) -> Option<Direction> {
        if delta > 0.0 {
            Some(Direction::Down)
        } else if delta < 0.0 {
            Some(Direction::Up)
        } else {
            None
        }
    }
}

/// Finds the frames at which the ball's vertical direction reverses for long enough
/// to count as a shot.
///
/// A sign flip of the smoothed vertical velocity is a candidate; it becomes a shot
/// when the new direction holds for at least `min_window` of the following
/// `ceil(scan_factor * min_window)` frames. Single-frame flips from detection jitter
/// are rejected this way, but this remains a heuristic rather than a contact detector.
#[derive(Clone, Debug)]
pub struct ShotDetector {
    settings: ShotSettings,
}

impl ShotDetector {
    pub fn new(settings: &ShotSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Detects shot frames in a dense ball trajectory.
    ///
    /// The result is strictly increasing and every frame lies in `[1, N - 1]`.
    pub fn detect(&self, trajectory: &[BoundingBox]) -> Vec<FrameIndex> {
        let scan = self.settings.scan_window();
        let num_frames = trajectory.len();
        if num_frames < scan.saturating_add(2) {
            log::debug!(
                "Trajectory of {} frames is too short to detect shots (need {})",
                num_frames,
                scan.saturating_add(2)
            );
            return Vec::new();
        }

        let smoothed = MovingAverage::apply(
            self.settings.smoothing_window,
            trajectory.iter().map(BoundingBox::mid_y),
        );
        // delta[0] is undefined and never read
        let delta: Vec<f64> = std::iter::once(0.0)
            .chain(smoothed.windows(2).map(|w| w[1] - w[0]))
            .collect();

        let mut shots = Vec::new();
        for frame in 1..num_frames - scan {
            let after = match (Direction::of(delta[frame]), Direction::of(delta[frame + 1])) {
                (Some(before), Some(after)) if before != after => after,
                _ => continue,
            };

            let persisting = delta[frame + 1..=frame + scan]
                .iter()
                .filter(|d| Direction::of(**d) == Some(after))
                .count();
            if persisting >= self.settings.min_window {
                shots.push(frame);
            }
        }

        log::debug!("Detected {} shots in {} frames", shots.len(), num_frames);
        shots
    }
}
