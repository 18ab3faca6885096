use serde::{Deserialize, Serialize};

/// Result of tempo detection over a selected range.
///
/// `bpm == 0` with zero confidence is the sentinel for "no usable tempo":
/// a too-short range, a silent segment, and a flat correlogram all collapse
/// to it. Callers must treat the sentinel as a detection failure, never as a
/// literal slow tempo.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TempoEstimate {
    /// Detected tempo rounded to the nearest whole BPM.
    pub bpm: u32,
    /// Peakiness of the autocorrelation, in `[0, 1]`.
    pub confidence: f32,
}

impl TempoEstimate {
    /// Sentinel for "detection failed".
    pub const NONE: Self = Self {
        bpm: 0,
        confidence: 0.0,
    };

    pub fn new(bpm: u32, confidence: f32) -> Self {
        Self { bpm, confidence }
    }

    pub fn is_none(&self) -> bool {
        self.bpm == 0
    }

    /// Beat period in milliseconds, `None` for the sentinel.
    pub fn beat_period_ms(&self) -> Option<f64> {
        if self.bpm == 0 {
            None
        } else {
            Some(60_000.0 / self.bpm as f64)
        }
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }
}

/// Human-facing stability bucket for a confidence score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 0.60 {
            ConfidenceBand::High
        } else if confidence >= 0.35 {
            ConfidenceBand::Medium
        } else if confidence >= 0.15 {
            ConfidenceBand::Low
        } else {
            ConfidenceBand::VeryLow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
            ConfidenceBand::VeryLow => "very low",
        }
    }
}
