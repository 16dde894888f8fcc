use courtside_core::{
    keypoint, CourtDimensions, MiniCourtSettings, Vector2, NUM_COURT_KEYPOINTS,
};
use serde::{Deserialize, Serialize};

/// Pairs of keypoints joined by a court line on the reference canvas.
pub const COURT_LINES: [(usize, usize); 8] = [
    (keypoint::FAR_BASELINE_LEFT, keypoint::NEAR_BASELINE_LEFT),
    (keypoint::FAR_SINGLES_LEFT, keypoint::NEAR_SINGLES_LEFT),
    (keypoint::FAR_SINGLES_RIGHT, keypoint::NEAR_SINGLES_RIGHT),
    (keypoint::FAR_BASELINE_RIGHT, keypoint::NEAR_BASELINE_RIGHT),
    (keypoint::FAR_BASELINE_LEFT, keypoint::FAR_BASELINE_RIGHT),
    (keypoint::FAR_SERVICE_LEFT, keypoint::FAR_SERVICE_RIGHT),
    (keypoint::NEAR_SERVICE_LEFT, keypoint::NEAR_SERVICE_RIGHT),
    (keypoint::NEAR_BASELINE_LEFT, keypoint::NEAR_BASELINE_RIGHT),
];

/// Fixed conversion between real-world meters and reference canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourtScale {
    /// Canvas pixels per real-world meter
    pixels_per_meter: f64,
}

impl CourtScale {
    /// Scale at which `width_m` meters span `width_px` canvas pixels.
    pub fn new(width_px: f64, width_m: f64) -> Self {
        Self {
            pixels_per_meter: width_px / width_m,
        }
    }

    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        meters * self.pixels_per_meter
    }

    pub fn pixels_to_meters(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_meter
    }
}

/// An axis-aligned rectangle on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    pub start: Vector2,
    pub end: Vector2,
}

impl CanvasRect {
    pub fn width(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn height(&self) -> f64 {
        self.end.y - self.start.y
    }
}

/// The reference court ("mini court"): a perspective-free rendering of the court
/// keypoints at a fixed scale, used as the common coordinate space for every
/// tracked entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiniCourtLayout {
    /// Background rectangle the court is drawn on
    pub background: CanvasRect,
    /// Rectangle reserved for the court drawing (inside the padding)
    pub court: CanvasRect,
    /// Canvas positions of the 14 court keypoints, in the source keypoint order
    pub keypoints: [Vector2; NUM_COURT_KEYPOINTS],
    /// Left and right end of the net
    pub net: [Vector2; 2],
    scale: CourtScale,
}

impl MiniCourtLayout {
    /// Lays out the court from canvas settings and real-world measurements.
    pub fn new(canvas: &MiniCourtSettings, court: &CourtDimensions) -> Self {
        let end = Vector2::new(
            canvas.frame_width - canvas.buffer,
            canvas.canvas_height + canvas.buffer,
        );
        let start = end - Vector2::new(canvas.canvas_width, canvas.canvas_height);
        let background = CanvasRect { start, end };
        let padding = Vector2::new(canvas.padding, canvas.padding);
        let court_rect = CanvasRect {
            start: start + padding,
            end: end - padding,
        };
        let scale = CourtScale::new(court_rect.width(), court.doubles_width);
        let m = |meters: f64| scale.meters_to_pixels(meters);

        let origin = court_rect.start;
        let court_width = court_rect.width();
        let mut kp = [Vector2::zeros(); NUM_COURT_KEYPOINTS];

        kp[keypoint::FAR_BASELINE_LEFT] = origin;
        kp[keypoint::FAR_BASELINE_RIGHT] = Vector2::new(court_rect.end.x, origin.y);
        kp[keypoint::NEAR_BASELINE_LEFT] =
            Vector2::new(origin.x, origin.y + m(court.half_court_length * 2.0));
        kp[keypoint::NEAR_BASELINE_RIGHT] = Vector2::new(
            origin.x + court_width,
            kp[keypoint::NEAR_BASELINE_LEFT].y,
        );

        // Singles sidelines, one alley in from the doubles corners
        let alley = Vector2::new(m(court.alley_width), 0.0);
        kp[keypoint::FAR_SINGLES_LEFT] = kp[keypoint::FAR_BASELINE_LEFT] + alley;
        kp[keypoint::NEAR_SINGLES_LEFT] = kp[keypoint::NEAR_BASELINE_LEFT] + alley;
        kp[keypoint::FAR_SINGLES_RIGHT] = kp[keypoint::FAR_BASELINE_RIGHT] - alley;
        kp[keypoint::NEAR_SINGLES_RIGHT] = kp[keypoint::NEAR_BASELINE_RIGHT] - alley;

        // Service lines
        let no_mans_land = Vector2::new(0.0, m(court.no_mans_land_depth));
        let singles = Vector2::new(m(court.singles_width), 0.0);
        kp[keypoint::FAR_SERVICE_LEFT] = kp[keypoint::FAR_SINGLES_LEFT] + no_mans_land;
        kp[keypoint::FAR_SERVICE_RIGHT] = kp[keypoint::FAR_SERVICE_LEFT] + singles;
        kp[keypoint::NEAR_SERVICE_LEFT] = kp[keypoint::NEAR_SINGLES_LEFT] - no_mans_land;
        kp[keypoint::NEAR_SERVICE_RIGHT] = kp[keypoint::NEAR_SERVICE_LEFT] + singles;

        kp[keypoint::FAR_SERVICE_CENTER] =
            (kp[keypoint::FAR_SERVICE_LEFT] + kp[keypoint::FAR_SERVICE_RIGHT]) / 2.0;
        kp[keypoint::NEAR_SERVICE_CENTER] =
            (kp[keypoint::NEAR_SERVICE_LEFT] + kp[keypoint::NEAR_SERVICE_RIGHT]) / 2.0;

        let net_y = (kp[keypoint::FAR_BASELINE_LEFT].y + kp[keypoint::NEAR_BASELINE_LEFT].y) / 2.0;
        let net = [
            Vector2::new(kp[keypoint::FAR_BASELINE_LEFT].x, net_y),
            Vector2::new(kp[keypoint::FAR_BASELINE_RIGHT].x, net_y),
        ];

        Self {
            background,
            court: court_rect,
            keypoints: kp,
            net,
            scale,
        }
    }

    /// The meters/pixels conversion of this canvas.
    pub fn scale(&self) -> CourtScale {
        self.scale
    }

    /// Width of the court drawing in canvas pixels.
    pub fn court_width(&self) -> f64 {
        self.court.width()
    }

    pub fn keypoint(&self, index: usize) -> Option<Vector2> {
        self.keypoints.get(index).copied()
    }
}
