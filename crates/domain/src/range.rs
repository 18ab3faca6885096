use serde::{Deserialize, Serialize};

/// A selected time segment of an audio clip, in seconds from the clip start.
///
/// Ranges arrive from a selection UI and may be sloppy: endpoints outside the
/// clip or reversed orderings are not errors. [`SampleRange::clamped`] folds
/// them into a well-formed range, and a range whose clamped duration rounds to
/// zero samples simply yields the tempo sentinel downstream.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SampleRange {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl SampleRange {
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    /// Fold the range into `[0, duration_secs]` with `end >= start`.
    pub fn clamped(&self, duration_secs: f64) -> Self {
        let start = self.start_secs.clamp(0.0, duration_secs);
        let end = self.end_secs.clamp(0.0, duration_secs).max(start);
        Self {
            start_secs: start,
            end_secs: end,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }

    /// Truncate the range so it spans at most `max_secs`.
    pub fn capped(&self, max_secs: f64) -> Self {
        Self {
            start_secs: self.start_secs,
            end_secs: self.end_secs.min(self.start_secs + max_secs),
        }
    }

    /// True when both endpoints lie within `eps_secs` of `other`'s.
    pub fn approx_eq(&self, other: &Self, eps_secs: f64) -> bool {
        (self.start_secs - other.start_secs).abs() < eps_secs
            && (self.end_secs - other.end_secs).abs() < eps_secs
    }
}
