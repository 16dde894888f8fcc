use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{AnalyticsError, BoundingBox, Series, TrackId, TrackSeries};

/// Raw detector output for one video, as produced by the detection/tracking and
/// keypoint models.
///
/// This is also the on-disk detection cache: running the analytics from a stored
/// cache gives the same result as running it on fresh detections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetections {
    /// Person detections per frame, keyed by track id
    pub players: Vec<BTreeMap<TrackId, BoundingBox>>,
    /// Ball detection per frame, if any
    pub ball: Vec<Option<BoundingBox>>,
    /// Court keypoints as `[x0, y0, x1, y1, ...]`, from a single reference frame
    pub court_keypoints: Vec<f64>,
}

impl MatchDetections {
    /// Load a detection cache from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open detections {}", path.display()))?;
        let detections: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse detections {}", path.display()))?;
        log::debug!(
            "Loaded {} frames of detections from {}",
            detections.ball.len(),
            path.display()
        );
        Ok(detections)
    }

    /// Store the detections as a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create detections {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).context("Failed to serialize detections")?;
        writer.flush()?;
        Ok(())
    }

    /// Number of frames, checking that the ball and player streams are aligned.
    pub fn num_frames(&self) -> Result<usize, AnalyticsError> {
        if self.ball.len() != self.players.len() {
            return Err(AnalyticsError::FrameCountMismatch {
                ball: self.ball.len(),
                players: self.players.len(),
            });
        }
        Ok(self.ball.len())
    }

    /// Player detections as per-identity series. Malformed boxes count as missing.
    pub fn player_tracks(&self) -> TrackSeries<BoundingBox> {
        TrackSeries::from_frames(self.players.iter().enumerate().map(|(frame, detections)| {
            detections
                .iter()
                .filter(|(id, bbox)| keep_valid(bbox, frame, format_args!("track {}", id)))
                .map(|(id, bbox)| (*id, *bbox))
                .collect()
        }))
    }

    /// Ball detections as a single series. Malformed boxes count as missing.
    pub fn ball_track(&self) -> Series<BoundingBox> {
        self.ball
            .iter()
            .enumerate()
            .map(|(frame, bbox)| bbox.filter(|b| keep_valid(b, frame, "ball")))
            .collect()
    }
}

fn keep_valid(bbox: &BoundingBox, frame: usize, what: impl std::fmt::Display) -> bool {
    if !bbox.is_valid() {
        log::warn!("Ignoring malformed {} box {:?} at frame {}", what, bbox, frame);
        return false;
    }
    true
}
