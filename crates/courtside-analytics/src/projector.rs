use courtside_core::{
    keypoint, AnalyticsError, BoundingBox, CourtDimensions, CourtKeypoints, ProjectionSettings,
    Series, TrackSeries, Vector2, NUM_COURT_KEYPOINTS,
};

use crate::mini_court::MiniCourtLayout;

/// Maps source-frame pixel positions onto the reference canvas.
///
/// A point is anchored to the source keypoint closest to it vertically (searched in
/// the keypoints of its half of the court), its pixel offset from that anchor is
/// converted to meters with a local pixels-per-meter estimate, and the offset is
/// re-applied to the anchor's canvas position at the canvas scale.
///
/// Players are scaled by their bounding-box height against their known real height;
/// the ball uses the width of the court line through its anchor.
#[derive(Clone, Debug)]
pub struct CourtProjector {
    keypoints: CourtKeypoints,
    layout: MiniCourtLayout,
    settings: ProjectionSettings,
    /// Source pixels per meter along the court line through each keypoint
    keypoint_scale: [f64; NUM_COURT_KEYPOINTS],
    /// Source y coordinate separating the far and near halves
    net_y: f64,
}

impl CourtProjector {
    pub fn new(
        keypoints: CourtKeypoints,
        layout: MiniCourtLayout,
        court: &CourtDimensions,
        settings: &ProjectionSettings,
    ) -> Result<Self, AnalyticsError> {
        for anchors in [&settings.upper_anchors, &settings.lower_anchors] {
            if anchors.is_empty() || anchors.iter().any(|&i| i >= NUM_COURT_KEYPOINTS) {
                return Err(AnalyticsError::InvalidSettings(format!(
                    "anchor keypoints {:?} are not a non-empty subset of 0..{}",
                    anchors, NUM_COURT_KEYPOINTS
                )));
            }
        }

        let mut keypoint_scale = [0.0; NUM_COURT_KEYPOINTS];
        for (index, scale) in keypoint_scale.iter_mut().enumerate() {
            let (a, b, meters) = calibration_line(index, court);
            let value = (keypoints[a] - keypoints[b]).norm() / meters;
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalyticsError::DegenerateCalibration { index, value });
            }
            *scale = value;
        }

        let net_y = (keypoints[keypoint::FAR_SERVICE_CENTER].y
            + keypoints[keypoint::NEAR_SERVICE_CENTER].y)
            / 2.0;

        Ok(Self {
            keypoints,
            layout,
            settings: settings.clone(),
            keypoint_scale,
            net_y,
        })
    }

    pub fn layout(&self) -> &MiniCourtLayout {
        &self.layout
    }

    /// Source pixels per meter at the given keypoint, from the width of the court
    /// line through it.
    pub fn keypoint_scale(&self, index: usize) -> Option<f64> {
        self.keypoint_scale.get(index).copied()
    }

    /// The anchor keypoint for a source point: the vertically closest keypoint among
    /// the anchors of the point's half of the court.
    pub fn anchor_for(&self, point: Vector2) -> usize {
        let anchors = if point.y < self.net_y {
            &self.settings.upper_anchors
        } else {
            &self.settings.lower_anchors
        };
        anchors
            .iter()
            .copied()
            .min_by(|&a, &b| {
                let da = (point.y - self.keypoints[a].y).abs();
                let db = (point.y - self.keypoints[b].y).abs();
                da.total_cmp(&db)
            })
            // Anchor lists are checked to be non-empty in `new`
            .unwrap_or(keypoint::NEAR_BASELINE_LEFT)
    }

    /// Projects a source point given the local source pixels-per-meter.
    pub fn project_point(&self, point: Vector2, source_pixels_per_meter: f64) -> Vector2 {
        let anchor = self.anchor_for(point);
        let offset_m = (point - self.keypoints[anchor]) / source_pixels_per_meter;
        let canvas_ppm = self.layout.scale().pixels_per_meter();
        self.layout.keypoints[anchor] + offset_m * canvas_ppm
    }

    /// Projects a player's foot-point, scaling by the player's height.
    pub fn project_player(&self, bbox: &BoundingBox, height_px: f64, height_m: f64) -> Vector2 {
        self.project_point(bbox.foot_point(), height_px / height_m)
    }

    /// Projects the ball's center, scaling by the anchor keypoint's calibration.
    pub fn project_ball(&self, bbox: &BoundingBox) -> Vector2 {
        let center = bbox.center();
        let anchor = self.anchor_for(center);
        self.project_point(center, self.keypoint_scale[anchor])
    }

    /// Projects a dense ball trajectory.
    pub fn project_ball_trajectory(&self, trajectory: &[BoundingBox]) -> Series<Vector2> {
        trajectory.iter().map(|b| Some(self.project_ball(b))).collect()
    }

    /// Projects every player track, keeping frames and identities.
    ///
    /// The reference heights are assigned in ascending track id order.
    pub fn project_players(&self, players: &TrackSeries<BoundingBox>) -> TrackSeries<Vector2> {
        let ids: Vec<_> = players.ids().collect();
        let heights = &self.settings.player_heights_m;

        players.map_tracks(|id, track| {
            let rank = ids.iter().position(|&other| other == id).unwrap_or(0);
            let height_m = heights[rank.min(heights.len() - 1)];

            let mut projected = Series::empty(track.len());
            for (frame, bbox) in track.present() {
                let height_px = self.max_height_around(track, frame);
                if height_px <= 0.0 {
                    log::debug!("Skipping zero-height box of track {} at frame {}", id, frame);
                    continue;
                }
                projected.set(frame, Some(self.project_player(bbox, height_px, height_m)));
            }
            projected
        })
    }

    /// Tallest box of the track within the height window around `frame`.
    fn max_height_around(&self, track: &Series<BoundingBox>, frame: usize) -> f64 {
        let start = frame.saturating_sub(self.settings.height_window_before);
        let end = frame.saturating_add(self.settings.height_window_after).min(track.len());
        (start..end)
            .filter_map(|f| track.get(f))
            .map(BoundingBox::height)
            .fold(0.0, f64::max)
    }
}

/// The court line used to calibrate a keypoint: its two end keypoints and real length.
fn calibration_line(index: usize, court: &CourtDimensions) -> (usize, usize, f64) {
    use keypoint::*;

    match index {
        FAR_BASELINE_LEFT | FAR_BASELINE_RIGHT | FAR_SINGLES_LEFT | FAR_SINGLES_RIGHT => {
            (FAR_BASELINE_LEFT, FAR_BASELINE_RIGHT, court.doubles_width)
        }
        NEAR_BASELINE_LEFT | NEAR_BASELINE_RIGHT | NEAR_SINGLES_LEFT | NEAR_SINGLES_RIGHT => {
            (NEAR_BASELINE_LEFT, NEAR_BASELINE_RIGHT, court.doubles_width)
        }
        FAR_SERVICE_LEFT | FAR_SERVICE_RIGHT | FAR_SERVICE_CENTER => {
            (FAR_SERVICE_LEFT, FAR_SERVICE_RIGHT, court.singles_width)
        }
        _ => (NEAR_SERVICE_LEFT, NEAR_SERVICE_RIGHT, court.singles_width),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use approx::assert_relative_eq;
    use courtside_core::{MiniCourtSettings, TrackId};

    const ZOOM: f64 = 2.0;

    fn layout() -> MiniCourtLayout {
        MiniCourtLayout::new(&MiniCourtSettings::default(), &CourtDimensions::default())
    }

    /// Source point seen by a perspective-free camera: the canvas zoomed and shifted.
    fn to_source(canvas: Vector2) -> Vector2 {
        canvas * ZOOM + Vector2::new(-3000.0, 100.0)
    }

    fn projector() -> CourtProjector {
        let layout = layout();
        let source: Vec<_> = layout.keypoints.iter().map(|&k| to_source(k)).collect();
        CourtProjector::new(
            CourtKeypoints::new(&source).unwrap(),
            layout,
            &CourtDimensions::default(),
            &ProjectionSettings::default(),
        )
        .unwrap()
    }

    /// Box whose pixel height makes the local scale equal the camera zoom.
    fn player_box(foot: Vector2, height_m: f64) -> BoundingBox {
        let height_px = ZOOM * layout().scale().pixels_per_meter() * height_m;
        BoundingBox::new(foot.x - 20.0, foot.y - height_px, foot.x + 20.0, foot.y)
    }

    #[test]
    fn test_keypoint_calibration() {
        let projector = projector();
        let canvas_ppm = projector.layout().scale().pixels_per_meter();
        for index in 0..NUM_COURT_KEYPOINTS {
            assert_relative_eq!(
                projector.keypoint_scale(index).unwrap(),
                ZOOM * canvas_ppm,
                epsilon = 1e-9
            );
        }
        assert_eq!(projector.keypoint_scale(NUM_COURT_KEYPOINTS), None);
    }

    #[test]
    fn test_ball_recovers_canvas_position() {
        let projector = projector();
        for canvas in [Vector2::new(1700.0, 120.0), Vector2::new(1790.0, 400.0)] {
            let source = to_source(canvas);
            let bbox = BoundingBox::new(source.x - 4.0, source.y - 4.0, source.x + 4.0, source.y + 4.0);
            let projected = projector.project_ball(&bbox);
            assert_relative_eq!(projected.x, canvas.x, epsilon = 1e-9);
            assert_relative_eq!(projected.y, canvas.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_player_recovers_canvas_position() {
        let projector = projector();
        let canvas = Vector2::new(1750.0, 460.0);
        let bbox = player_box(to_source(canvas), 1.88);
        let projected = projector.project_player(&bbox, bbox.height(), 1.88);
        assert_relative_eq!(projected.x, canvas.x, epsilon = 1e-9);
        assert_relative_eq!(projected.y, canvas.y, epsilon = 1e-9);
    }

    #[test]
    fn test_taller_box_shrinks_offset() {
        let projector = projector();
        let foot = to_source(Vector2::new(1750.0, 460.0));
        let anchor = projector.anchor_for(foot);
        let anchor_canvas = projector.layout().keypoints[anchor];

        let bbox = player_box(foot, 1.88);
        let normal = projector.project_player(&bbox, bbox.height(), 1.88);
        let doubled = projector.project_player(&bbox, bbox.height() * 2.0, 1.88);
        assert_relative_eq!(
            (doubled - anchor_canvas).norm(),
            (normal - anchor_canvas).norm() / 2.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_anchor_uses_vertical_distance_within_half() {
        let projector = projector();
        let layout = layout();
        // Just below the far service line, far to the right: still anchored on the
        // far service T since only the vertical distance counts
        let far = to_source(layout.keypoints[12] + Vector2::new(90.0, 5.0));
        assert_eq!(projector.anchor_for(far), 12);
        // Just behind the far baseline
        let behind = to_source(layout.keypoints[0] + Vector2::new(100.0, -10.0));
        assert_eq!(projector.anchor_for(behind), 0);
        // Near half only considers the near anchors
        let near = to_source(layout.keypoints[13] + Vector2::new(0.0, 10.0));
        assert_eq!(projector.anchor_for(near), 13);
        let near_baseline = to_source(layout.keypoints[2] + Vector2::new(30.0, -20.0));
        assert_eq!(projector.anchor_for(near_baseline), 2);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let projector = projector();
        let point = Vector2::new(412.25, 689.5);
        let first = projector.project_point(point, 37.0);
        let second = projector.project_point(point, 37.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_project_players_uses_tallest_box_in_window() {
        let projector = projector();
        let canvas = Vector2::new(1750.0, 460.0);
        let standing = player_box(to_source(canvas), 1.88);
        // Crouching: same foot-point, half the height
        let crouching = BoundingBox::new(
            standing.x1,
            standing.y2 - standing.height() / 2.0,
            standing.x2,
            standing.y2,
        );
        let id = TrackId::new(3);
        let frames = vec![
            BTreeMap::from([(id, standing)]),
            BTreeMap::from([(id, crouching)]),
            BTreeMap::new(),
        ];
        let players = TrackSeries::from_frames(frames);

        let projected = projector.project_players(&players);
        assert_eq!(projected.num_frames(), 3);
        let p0 = projected.get(id, 0).unwrap();
        let p1 = projected.get(id, 1).unwrap();
        assert_relative_eq!(p1.x, p0.x, epsilon = 1e-9);
        assert_relative_eq!(p1.y, p0.y, epsilon = 1e-9);
        assert_relative_eq!(p0.y, canvas.y, epsilon = 1e-9);
        assert!(projected.get(id, 2).is_none());
    }

    #[test]
    fn test_heights_follow_track_order() {
        let projector = projector();
        let canvas = Vector2::new(1750.0, 460.0);
        let bbox = player_box(to_source(canvas), 1.91);
        let frames = vec![BTreeMap::from([
            (TrackId::new(2), player_box(to_source(canvas), 1.88)),
            (TrackId::new(8), bbox),
        ])];
        let projected = projector.project_players(&TrackSeries::from_frames(frames));
        // Track 8 is the second player, so its box is scaled against 1.91 m
        let p = projected.get(TrackId::new(8), 0).unwrap();
        assert_relative_eq!(p.y, canvas.y, epsilon = 1e-9);
        let p = projected.get(TrackId::new(2), 0).unwrap();
        assert_relative_eq!(p.y, canvas.y, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_keypoints() {
        let layout = layout();
        let mut source: Vec<_> = layout.keypoints.iter().map(|&k| to_source(k)).collect();
        source[1] = source[0];
        let err = CourtProjector::new(
            CourtKeypoints::new(&source).unwrap(),
            layout,
            &CourtDimensions::default(),
            &ProjectionSettings::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::DegenerateCalibration {
                index: 0,
                value: 0.0
            }
        );
    }

    #[test]
    fn test_invalid_anchor_settings() {
        let layout = layout();
        let source: Vec<_> = layout.keypoints.iter().map(|&k| to_source(k)).collect();
        let settings = ProjectionSettings {
            lower_anchors: vec![],
            ..Default::default()
        };
        let result = CourtProjector::new(
            CourtKeypoints::new(&source).unwrap(),
            layout,
            &CourtDimensions::default(),
            &settings,
        );
        assert!(matches!(result, Err(AnalyticsError::InvalidSettings(_))));
    }

    #[test]
    fn test_unbounded_height_window() {
        let layout = layout();
        let source: Vec<_> = layout.keypoints.iter().map(|&k| to_source(k)).collect();
        let settings = ProjectionSettings {
            height_window_before: usize::MAX,
            height_window_after: usize::MAX,
            ..Default::default()
        };
        let projector = CourtProjector::new(
            CourtKeypoints::new(&source).unwrap(),
            layout,
            &CourtDimensions::default(),
            &settings,
        )
        .unwrap();
        let canvas = Vector2::new(1750.0, 460.0);
        let id = TrackId::new(1);
        let frames = vec![BTreeMap::from([(id, player_box(to_source(canvas), 1.88))]); 3];

        let projected = projector.project_players(&TrackSeries::from_frames(frames));
        for frame in 0..3 {
            let p = projected.get(id, frame).unwrap();
            assert_relative_eq!(p.y, canvas.y, epsilon = 1e-9);
        }
    }
}
