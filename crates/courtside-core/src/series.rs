use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{FrameIndex, TrackId};

/// A frame-indexed sequence of optional samples for a single tracked object.
///
/// `None` at a frame means "not detected in that frame", never zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series<T> {
    samples: Vec<Option<T>>,
}

impl<T> Default for Series<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<T> Series<T> {
    /// Creates a series of `len` frames with no samples.
    pub fn empty(len: usize) -> Self {
        Self {
            samples: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    pub fn from_samples(samples: Vec<Option<T>>) -> Self {
        Self { samples }
    }

    /// Creates a series with a sample at every frame.
    pub fn from_dense(values: Vec<T>) -> Self {
        Self {
            samples: values.into_iter().map(Some).collect(),
        }
    }

    /// Number of frames covered by the series, present or not.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, frame: FrameIndex) -> Option<&T> {
        self.samples.get(frame).and_then(Option::as_ref)
    }

    /// Sets the sample at `frame`. Frames past the end are ignored.
    pub fn set(&mut self, frame: FrameIndex, value: Option<T>) {
        if let Some(slot) = self.samples.get_mut(frame) {
            *slot = value;
        }
    }

    pub fn samples(&self) -> &[Option<T>] {
        &self.samples
    }

    /// Iterates over the frames that have a sample.
    pub fn present(&self) -> impl Iterator<Item = (FrameIndex, &T)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(frame, sample)| sample.as_ref().map(|s| (frame, s)))
    }

    pub fn present_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    /// Whether every frame has a sample.
    pub fn is_dense(&self) -> bool {
        self.samples.iter().all(Option::is_some)
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Series<U> {
        Series {
            samples: self.samples.iter().map(|s| s.as_ref().map(&mut f)).collect(),
        }
    }

    pub fn into_samples(self) -> Vec<Option<T>> {
        self.samples
    }
}

impl<T> FromIterator<Option<T>> for Series<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Sparse per-identity time series: one [`Series`] per track, all sharing the same
/// frame count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSeries<T> {
    num_frames: usize,
    tracks: BTreeMap<TrackId, Series<T>>,
}

impl<T> TrackSeries<T> {
    /// Creates a series covering `num_frames` frames without any tracks.
    pub fn new(num_frames: usize) -> Self {
        Self {
            num_frames,
            tracks: BTreeMap::new(),
        }
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of distinct identities.
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Identities in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks.keys().copied()
    }

    pub fn track(&self, id: TrackId) -> Option<&Series<T>> {
        self.tracks.get(&id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = (TrackId, &Series<T>)> {
        self.tracks.iter().map(|(id, series)| (*id, series))
    }

    pub fn get(&self, id: TrackId, frame: FrameIndex) -> Option<&T> {
        self.tracks.get(&id).and_then(|series| series.get(frame))
    }

    /// Records a sample for `id` at `frame`, creating the track if needed.
    pub fn insert(&mut self, id: TrackId, frame: FrameIndex, value: T) {
        if frame >= self.num_frames {
            log::warn!(
                "Dropping sample for track {} at frame {} past the end ({} frames)",
                id,
                frame,
                self.num_frames
            );
            return;
        }
        let num_frames = self.num_frames;
        self.tracks
            .entry(id)
            .or_insert_with(|| Series::empty(num_frames))
            .set(frame, Some(value));
    }

    /// All identities detected at `frame`, in ascending id order.
    pub fn at_frame(&self, frame: FrameIndex) -> impl Iterator<Item = (TrackId, &T)> {
        self.tracks
            .iter()
            .filter_map(move |(id, series)| series.get(frame).map(|v| (*id, v)))
    }

    /// Keeps only the given identities.
    pub fn retain_ids(&self, ids: &BTreeSet<TrackId>) -> Self
    where
        T: Clone,
    {
        Self {
            num_frames: self.num_frames,
            tracks: self
                .tracks
                .iter()
                .filter(|(id, _)| ids.contains(id))
                .map(|(id, series)| (*id, series.clone()))
                .collect(),
        }
    }

    /// Maps every track with access to its identity and full series.
    pub fn map_tracks<U>(&self, mut f: impl FnMut(TrackId, &Series<T>) -> Series<U>) -> TrackSeries<U> {
        TrackSeries {
            num_frames: self.num_frames,
            tracks: self
                .tracks
                .iter()
                .map(|(id, series)| (*id, f(*id, series)))
                .collect(),
        }
    }

    /// Builds the series from one identity map per frame.
    pub fn from_frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = BTreeMap<TrackId, T>>,
    {
        let frames: Vec<_> = frames.into_iter().collect();
        let mut series = Self::new(frames.len());
        for (frame, detections) in frames.into_iter().enumerate() {
            for (id, value) in detections {
                series.insert(id, frame, value);
            }
        }
        series
    }

    /// Converts back to one identity map per frame.
    pub fn to_frames(&self) -> Vec<BTreeMap<TrackId, T>>
    where
        T: Clone,
    {
        (0..self.num_frames)
            .map(|frame| {
                self.at_frame(frame)
                    .map(|(id, value)| (id, value.clone()))
                    .collect()
            })
            .collect()
    }
}
