use courtside_core::{
    AnalyticsError, AnalyticsSettings, BoundingBox, CourtKeypoints, FrameIndex, MatchDetections,
    Series, TrackSeries, Vector2,
};
use serde::{Deserialize, Serialize};

use crate::{
    interpolate::interpolate_track,
    mini_court::MiniCourtLayout,
    projector::CourtProjector,
    selection::PlayerSelector,
    shots::ShotDetector,
    stats::{MatchStats, StatsAggregator},
};

/// Everything derived from one video's detections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub num_frames: usize,
    /// Source-frame boxes of the selected players
    pub players: TrackSeries<BoundingBox>,
    /// Gap-free ball track in source pixels, empty if the ball was never detected
    pub ball_trajectory: Vec<BoundingBox>,
    /// Frames at which a shot was detected, strictly increasing
    pub shot_frames: Vec<FrameIndex>,
    /// The reference canvas all positions below are expressed in
    pub layout: MiniCourtLayout,
    pub player_positions: TrackSeries<Vector2>,
    pub ball_positions: Series<Vector2>,
    pub stats: MatchStats,
}

/// Runs the analytics stages over a video's detections.
#[derive(Clone, Debug)]
pub struct MatchAnalyzer {
    settings: AnalyticsSettings,
}

impl MatchAnalyzer {
    /// Create an analyzer, rejecting unusable settings.
    pub fn new(settings: &AnalyticsSettings) -> Result<Self, AnalyticsError> {
        settings.validate()?;
        Ok(Self {
            settings: settings.clone(),
        })
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    pub fn analyze(&self, detections: &MatchDetections) -> Result<MatchAnalysis, AnalyticsError> {
        let settings = &self.settings;
        let num_frames = detections.num_frames()?;
        let keypoints = CourtKeypoints::from_flat(&detections.court_keypoints)?;
        let layout = MiniCourtLayout::new(&settings.mini_court, &settings.court);
        let projector = CourtProjector::new(
            keypoints.clone(),
            layout.clone(),
            &settings.court,
            &settings.projection,
        )?;
        log::info!("Analyzing {} frames", num_frames);

        let ball_trajectory = interpolate_track(&detections.ball_track());
        let players = PlayerSelector::new(&settings.selection)
            .select(&detections.player_tracks(), &keypoints);

        let shot_frames = ShotDetector::new(&settings.shots).detect(&ball_trajectory);
        let player_positions = projector.project_players(&players);
        let ball_positions = if ball_trajectory.is_empty() {
            Series::empty(num_frames)
        } else {
            projector.project_ball_trajectory(&ball_trajectory)
        };

        let stats = StatsAggregator::new(settings.frame_rate, layout.scale()).aggregate(
            &shot_frames,
            &ball_positions,
            &player_positions,
            num_frames,
        );
        log::info!(
            "Found {} shots, {} of them measured",
            shot_frames.len(),
            stats.shots.len()
        );

        Ok(MatchAnalysis {
            num_frames,
            players,
            ball_trajectory,
            shot_frames,
            layout,
            player_positions,
            ball_positions,
            stats,
        })
    }
}
