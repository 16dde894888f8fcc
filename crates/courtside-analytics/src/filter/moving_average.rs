use std::collections::VecDeque;

/// A trailing moving average over the last `window` samples.
///
/// Until the window is full, the average is taken over the samples seen so far.
#[derive(Debug)]
pub struct MovingAverage {
    /// The number of samples averaged.
    window: usize,
    /// The most recent samples, newest at the back.
    buffer: VecDeque<f64>,
}

impl MovingAverage {
    /// Creates a new MovingAverage with the given window.
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "Window must be at least one sample");

        MovingAverage {
            window,
            buffer: VecDeque::with_capacity(window),
        }
    }

    /// Updates the filter with a new input sample and returns the filtered output.
    pub fn update(&mut self, input: f64) -> f64 {
        self.buffer.push_back(input);
        if self.buffer.len() > self.window {
            self.buffer.pop_front();
        }

        // Summed from scratch so the output depends only on the samples in the window
        let total: f64 = self.buffer.iter().sum();
        total / self.buffer.len() as f64
    }

    /// Filters a whole sequence.
    pub fn apply(window: usize, samples: impl IntoIterator<Item = f64>) -> Vec<f64> {
        let mut filter = MovingAverage::new(window);
        samples.into_iter().map(|s| filter.update(s)).collect()
    }
}
