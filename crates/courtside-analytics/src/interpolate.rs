use courtside_core::{BoundingBox, Series};

/// Fills every gap of a single object's track, producing a dense trajectory.
///
/// Interior gaps are linearly interpolated per coordinate between the nearest
/// detections before and after. Frames before the first detection copy the first
/// detection, frames after the last one copy the last. A track without any
/// detection yields an empty trajectory, so callers must handle zero detections.
pub fn interpolate_track(track: &Series<BoundingBox>) -> Vec<BoundingBox> {
    let known: Vec<(usize, &BoundingBox)> = track.present().collect();
    let (Some(&(first_frame, first)), Some(&(last_frame, last))) = (known.first(), known.last())
    else {
        log::warn!(
            "Track has no detections in {} frames, nothing to interpolate",
            track.len()
        );
        return Vec::new();
    };

    let mut dense = Vec::with_capacity(track.len());
    dense.extend(std::iter::repeat(*first).take(first_frame));

    for pair in known.windows(2) {
        let (start_frame, start) = pair[0];
        let (end_frame, end) = pair[1];
        dense.push(*start);
        let span = (end_frame - start_frame) as f64;
        for frame in start_frame + 1..end_frame {
            let t = (frame - start_frame) as f64 / span;
            dense.push(lerp(start, end, t));
        }
    }

    dense.push(*last);
    dense.extend(std::iter::repeat(*last).take(track.len() - last_frame - 1));

    log::debug!(
        "Interpolated {} of {} frames",
        track.len() - known.len(),
        track.len()
    );
    dense
}

fn lerp(a: &BoundingBox, b: &BoundingBox, t: f64) -> BoundingBox {
    let a = a.to_array();
    let b = b.to_array();
    BoundingBox::from(std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t))
}
