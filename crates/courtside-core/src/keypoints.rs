use serde::{Deserialize, Serialize};

use crate::{AnalyticsError, Vector2};

/// Number of semantic court keypoints.
pub const NUM_COURT_KEYPOINTS: usize = 14;

/// Semantic positions of the court keypoints, shared by the source frame and the
/// reference canvas.
pub mod keypoint {
    /// Far baseline, left doubles corner
    pub const FAR_BASELINE_LEFT: usize = 0;
    /// Far baseline, right doubles corner
    pub const FAR_BASELINE_RIGHT: usize = 1;
    /// Near baseline, left doubles corner
    pub const NEAR_BASELINE_LEFT: usize = 2;
    /// Near baseline, right doubles corner
    pub const NEAR_BASELINE_RIGHT: usize = 3;
    pub const FAR_SINGLES_LEFT: usize = 4;
    pub const NEAR_SINGLES_LEFT: usize = 5;
    pub const FAR_SINGLES_RIGHT: usize = 6;
    pub const NEAR_SINGLES_RIGHT: usize = 7;
    pub const FAR_SERVICE_LEFT: usize = 8;
    pub const FAR_SERVICE_RIGHT: usize = 9;
    pub const NEAR_SERVICE_LEFT: usize = 10;
    pub const NEAR_SERVICE_RIGHT: usize = 11;
    /// Far center service T
    pub const FAR_SERVICE_CENTER: usize = 12;
    /// Near center service T
    pub const NEAR_SERVICE_CENTER: usize = 13;
}

/// The 14 court keypoints detected once per video, in source pixel space.
///
/// Consumers rely on the positional order described in [`keypoint`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CourtKeypoints {
    points: [Vector2; NUM_COURT_KEYPOINTS],
}

impl CourtKeypoints {
    /// Creates the keypoints from exactly 14 finite points.
    pub fn new(points: &[Vector2]) -> Result<Self, AnalyticsError> {
        if points.len() != NUM_COURT_KEYPOINTS {
            return Err(AnalyticsError::KeypointCount {
                expected: NUM_COURT_KEYPOINTS,
                found: points.len(),
            });
        }
        let mut out = [Vector2::zeros(); NUM_COURT_KEYPOINTS];
        for (index, point) in points.iter().enumerate() {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(AnalyticsError::NonFiniteKeypoint { index });
            }
            out[index] = *point;
        }
        Ok(Self { points: out })
    }

    /// Creates the keypoints from the flat `[x0, y0, x1, y1, ...]` layout emitted by
    /// the keypoint regressor.
    pub fn from_flat(coords: &[f64]) -> Result<Self, AnalyticsError> {
        if coords.len() != NUM_COURT_KEYPOINTS * 2 {
            return Err(AnalyticsError::KeypointCount {
                expected: NUM_COURT_KEYPOINTS * 2,
                found: coords.len(),
            });
        }
        let points: Vec<_> = coords
            .chunks_exact(2)
            .map(|xy| Vector2::new(xy[0], xy[1]))
            .collect();
        Self::new(&points)
    }

    pub fn get(&self, index: usize) -> Option<Vector2> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Vector2; NUM_COURT_KEYPOINTS] {
        &self.points
    }

    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }
}

impl std::ops::Index<usize> for CourtKeypoints {
    type Output = Vector2;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl TryFrom<Vec<f64>> for CourtKeypoints {
    type Error = AnalyticsError;

    fn try_from(coords: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_flat(&coords)
    }
}

impl From<CourtKeypoints> for Vec<f64> {
    fn from(keypoints: CourtKeypoints) -> Self {
        keypoints.to_flat()
    }
}
