use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{AnalyticsError, NUM_COURT_KEYPOINTS};

/// Upper bound on any configured frame window.
pub const MAX_WINDOW_FRAMES: usize = 100_000;

/// Most players the selector may keep, one per stats slot.
pub const MAX_PLAYERS: usize = 2;

/// Real-world tennis court measurements, in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtDimensions {
    /// Width between the doubles sidelines
    pub doubles_width: f64,
    /// Width between the singles sidelines
    pub singles_width: f64,
    /// Width of one doubles alley (between a singles and a doubles sideline)
    pub alley_width: f64,
    /// Depth between a baseline and its service line
    pub no_mans_land_depth: f64,
    /// Depth between a baseline and the net
    pub half_court_length: f64,
}

impl Default for CourtDimensions {
    fn default() -> Self {
        Self {
            doubles_width: 10.97,
            singles_width: 8.23,
            alley_width: 1.37,
            no_mans_land_depth: 5.48,
            half_court_length: 11.88,
        }
    }
}

/// Placement of the reference canvas (mini court) in output pixel space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniCourtSettings {
    /// Width of the source frame the canvas is anchored to, in px. The canvas sits in
    /// the top-right corner.
    pub frame_width: f64,
    /// Width of the canvas background, in px
    pub canvas_width: f64,
    /// Height of the canvas background, in px
    pub canvas_height: f64,
    /// Margin between the canvas and the frame edges, in px
    pub buffer: f64,
    /// Margin between the canvas background and the court drawing, in px
    pub padding: f64,
}

impl Default for MiniCourtSettings {
    fn default() -> Self {
        Self {
            frame_width: 1920.0,
            canvas_width: 250.0,
            canvas_height: 450.0,
            buffer: 50.0,
            padding: 20.0,
        }
    }
}

/// Settings for the shot event detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotSettings {
    /// Minimum number of frames the new vertical direction must persist for a
    /// reversal to count as a shot.
    pub min_window: usize,
    /// Window of the trailing moving average applied to the ball's vertical center.
    pub smoothing_window: usize,
    /// Length of the scan after a candidate reversal, as a multiple of `min_window`.
    pub scan_factor: f64,
}

impl ShotSettings {
    /// Number of frames scanned after a candidate reversal.
    pub fn scan_window(&self) -> usize {
        (self.scan_factor * self.min_window as f64).ceil() as usize
    }
}

impl Default for ShotSettings {
    fn default() -> Self {
        Self {
            min_window: 25,
            smoothing_window: 5,
            scan_factor: 1.2,
        }
    }
}

/// Settings for picking the players of interest out of all person tracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Number of tracks to keep.
    pub players: usize,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self { players: 2 }
    }
}

/// Settings for projecting source positions onto the reference canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Real heights of player 1 and player 2, in meters.
    pub player_heights_m: [f64; 2],
    /// Frames before the current one considered for a player's pixel height.
    pub height_window_before: usize,
    /// Frames from the current one (exclusive end) considered for a player's pixel height.
    pub height_window_after: usize,
    /// Anchor keypoints for points in the far (upper) half of the court.
    pub upper_anchors: Vec<usize>,
    /// Anchor keypoints for points in the near (lower) half of the court.
    pub lower_anchors: Vec<usize>,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            player_heights_m: [1.88, 1.91],
            height_window_before: 20,
            height_window_after: 50,
            upper_anchors: vec![0, 12],
            lower_anchors: vec![2, 13],
        }
    }
}

/// All settings of the analytics pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Frame rate of the source video, in frames per second.
    pub frame_rate: f64,
    pub court: CourtDimensions,
    pub mini_court: MiniCourtSettings,
    pub shots: ShotSettings,
    pub selection: SelectionSettings,
    pub projection: ProjectionSettings,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            frame_rate: 24.0,
            court: CourtDimensions::default(),
            mini_court: MiniCourtSettings::default(),
            shots: ShotSettings::default(),
            selection: SelectionSettings::default(),
            projection: ProjectionSettings::default(),
        }
    }
}

impl AnalyticsSettings {
    /// Load the settings from a file, or store the default settings if the file does
    /// not exist.
    pub fn load_or_insert(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => {
                let settings: Self = serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse settings {}", path.display()))?;
                settings.validate()?;
                Ok(settings)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Writing default settings to {}", path.display());
                let settings = Self::default();
                settings.store(path)?;
                Ok(settings)
            }
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read settings {}", path.display()))
            }
        }
    }

    /// Store the settings in the given file.
    pub fn store(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings {}", path.display()))
    }

    /// Check that the settings describe a usable configuration.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let invalid = |msg: String| Err(AnalyticsError::InvalidSettings(msg));

        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return invalid(format!("frame rate must be positive, got {}", self.frame_rate));
        }
        let court = &self.court;
        for (name, value) in [
            ("doubles_width", court.doubles_width),
            ("singles_width", court.singles_width),
            ("alley_width", court.alley_width),
            ("no_mans_land_depth", court.no_mans_land_depth),
            ("half_court_length", court.half_court_length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("court {name} must be positive, got {value}"));
            }
        }
        let mini = &self.mini_court;
        if mini.canvas_width - 2.0 * mini.padding <= 0.0 {
            return invalid("mini court padding leaves no room for the court".to_string());
        }
        let shots = &self.shots;
        if shots.min_window == 0 || shots.smoothing_window == 0 {
            return invalid("shot windows must be at least one frame".to_string());
        }
        if !shots.scan_factor.is_finite() || shots.scan_window() < shots.min_window {
            return invalid(format!(
                "shot scan factor {} must be at least 1",
                shots.scan_factor
            ));
        }
        let projection = &self.projection;
        for (name, frames) in [
            ("shot min_window", shots.min_window),
            ("shot smoothing_window", shots.smoothing_window),
            ("shot scan window", shots.scan_window()),
            ("height_window_before", projection.height_window_before),
            ("height_window_after", projection.height_window_after),
        ] {
            if frames > MAX_WINDOW_FRAMES {
                return invalid(format!(
                    "{name} of {frames} frames exceeds {MAX_WINDOW_FRAMES}"
                ));
            }
        }
        if !(1..=MAX_PLAYERS).contains(&self.selection.players) {
            return invalid(format!(
                "selection must keep 1 to {MAX_PLAYERS} players, got {}",
                self.selection.players
            ));
        }
        if projection
            .player_heights_m
            .iter()
            .any(|h| !(h.is_finite() && *h > 0.0))
        {
            return invalid("player heights must be positive".to_string());
        }
        for (name, anchors) in [
            ("upper_anchors", &projection.upper_anchors),
            ("lower_anchors", &projection.lower_anchors),
        ] {
            if anchors.is_empty() {
                return invalid(format!("{name} must not be empty"));
            }
            if let Some(bad) = anchors.iter().find(|&&i| i >= NUM_COURT_KEYPOINTS) {
                return invalid(format!("{name} refers to unknown keypoint {bad}"));
            }
        }
        Ok(())
    }
}
