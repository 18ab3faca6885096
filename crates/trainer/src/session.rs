use cadence_domain::{PracticeReport, SampleRange, TempoEstimate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring;

/// One practice session against one selected range.
///
/// Timestamps are milliseconds relative to an arbitrary shared origin chosen
/// by the caller (typically session start on a monotonic clock); only
/// relative differences matter. The anchor marks where the performer placed
/// the "1" and does not have to precede the taps: errors are computed modulo
/// the beat period, so taps before the anchor are valid.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TapSession {
    bpm: f64,
    anchor_ms: Option<f64>,
    taps_ms: Vec<f64>,
}

impl TapSession {
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm,
            anchor_ms: None,
            taps_ms: Vec::new(),
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn anchor_ms(&self) -> Option<f64> {
        self.anchor_ms
    }

    pub fn taps_ms(&self) -> &[f64] {
        &self.taps_ms
    }

    pub fn tap_count(&self) -> usize {
        self.taps_ms.len()
    }

    /// Mark the downbeat ("set the 1"). Re-anchoring mid-session is allowed.
    pub fn set_anchor(&mut self, at_ms: f64) {
        self.anchor_ms = Some(at_ms);
    }

    pub fn record_tap(&mut self, at_ms: f64) {
        self.taps_ms.push(at_ms);
    }

    /// Clear anchor and taps. Called whenever the selected range changes.
    pub fn reset(&mut self) {
        debug!(taps = self.taps_ms.len(), "resetting tap session");
        self.anchor_ms = None;
        self.taps_ms.clear();
    }

    /// Scoring is meaningful only with an anchor and at least one tap.
    pub fn is_scorable(&self) -> bool {
        self.anchor_ms.is_some() && !self.taps_ms.is_empty()
    }

    /// Current timing stats, recomputed from the full tap sequence.
    pub fn stats(&self) -> Option<cadence_domain::TimingStats> {
        scoring::score(self)
    }

    /// Summarize the session for logging or export.
    pub fn report(
        &self,
        track: impl Into<String>,
        range: SampleRange,
        estimate: TempoEstimate,
    ) -> PracticeReport {
        PracticeReport::new(track, range, estimate, self.tap_count(), self.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_anchor_and_taps() {
        let mut session = TapSession::new(120.0);
        session.set_anchor(0.0);
        session.record_tap(480.0);
        assert!(session.is_scorable());

        session.reset();
        assert!(!session.is_scorable());
        assert_eq!(session.anchor_ms(), None);
        assert_eq!(session.tap_count(), 0);
        // The practice tempo survives a reset; it belongs to the range.
        assert_eq!(session.bpm(), 120.0);
    }

    #[test]
    fn not_scorable_without_anchor() {
        let mut session = TapSession::new(120.0);
        session.record_tap(100.0);
        assert!(!session.is_scorable());
        assert_eq!(session.stats(), None);
    }

    #[test]
    fn report_carries_tap_count_and_stats() {
        let mut session = TapSession::new(120.0);
        session.set_anchor(0.0);
        session.record_tap(500.0);
        session.record_tap(1000.0);

        let report = session.report(
            "mix.mp3",
            SampleRange::new(10.0, 18.0),
            TempoEstimate::new(120, 0.8),
        );
        assert_eq!(report.tap_count, 2);
        assert!(report.stats.is_some());
    }
}
