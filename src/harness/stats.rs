//! Summary statistics over measurement scores.

use serde::Serialize;

/// Summary of the measurement scores of one benchmark.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Statistics {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Sample standard deviation; `None` with fewer than two samples.
    pub std_dev: Option<f64>,
}

impl Statistics {
    /// Summarises `samples`, or returns `None` when there are none.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let std_dev = (count > 1).then(|| {
            let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        });
        Some(Self {
            count,
            mean,
            min,
            max,
            std_dev,
        })
    }
}
