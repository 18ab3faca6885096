use serde::{Deserialize, Serialize};

/// Timing accuracy of a tap sequence against a beat grid.
///
/// Derived, never stored: recomputed from the current tap session whenever
/// taps or the anchor change.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimingStats {
    /// Mean absolute error against the nearest grid instant, in ms.
    pub mean_abs_ms: f64,
    /// Population standard deviation of the signed errors, in ms.
    pub std_ms: f64,
    /// Trend of the signed error over elapsed session time. Positive means
    /// the performer is progressively lagging behind the grid.
    pub drift_ms_per_min: f64,
}
