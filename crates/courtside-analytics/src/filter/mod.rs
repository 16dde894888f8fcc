mod moving_average;

pub use moving_average::MovingAverage;
