use std::collections::BTreeSet;

use courtside_core::{BoundingBox, CourtKeypoints, SelectionSettings, TrackId, TrackSeries, Vector2};

/// Picks the players of interest among all person tracks: the tracks whose mean
/// foot-point lies closest to the court keypoints.
#[derive(Clone, Debug)]
pub struct PlayerSelector {
    settings: SelectionSettings,
}

impl PlayerSelector {
    pub fn new(settings: &SelectionSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Ranks every track by the distance from its mean foot-point to the nearest
    /// court keypoint, closest first. Ties go to the lower track id.
    pub fn rank(
        &self,
        tracks: &TrackSeries<BoundingBox>,
        keypoints: &CourtKeypoints,
    ) -> Vec<(TrackId, f64)> {
        let mut ranked: Vec<(TrackId, f64)> = tracks
            .tracks()
            .filter_map(|(id, series)| {
                let count = series.present_count();
                if count == 0 {
                    return None;
                }
                let mean = series
                    .present()
                    .fold(Vector2::zeros(), |acc, (_, bbox)| acc + bbox.foot_point())
                    / count as f64;
                let distance = keypoints
                    .points()
                    .iter()
                    .map(|k| (mean - k).norm())
                    .fold(f64::INFINITY, f64::min);
                Some((id, distance))
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked
    }

    /// Restricts the detections to the selected players, keeping their identities.
    pub fn select(
        &self,
        tracks: &TrackSeries<BoundingBox>,
        keypoints: &CourtKeypoints,
    ) -> TrackSeries<BoundingBox> {
        let chosen: BTreeSet<TrackId> = self
            .rank(tracks, keypoints)
            .into_iter()
            .take(self.settings.players)
            .map(|(id, _)| id)
            .collect();

        if chosen.len() < self.settings.players {
            log::warn!(
                "Only {} of {} players found among {} tracks",
                chosen.len(),
                self.settings.players,
                tracks.num_tracks()
            );
        } else {
            log::debug!("Selected player tracks {:?}", chosen);
        }
        tracks.retain_ids(&chosen)
    }
}
