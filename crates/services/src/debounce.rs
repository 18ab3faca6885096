//! Debounce and stale-result suppression for tempo detection.
//!
//! A range selector emits changes at high frequency while the user drags.
//! Detection only runs after a quiet period, each run is tagged with a
//! monotonically increasing generation, and a completion is only published
//! when its generation is still current, so a late-arriving but
//! earlier-issued result can never overwrite a newer one. The machine here is pure state
//! transitions; the async wrapper lives in [`crate::detector`].

use std::time::Duration;

use cadence_domain::SampleRange;
use tokio::time::Instant;
use tracing::debug;

/// Quiet period after the last range change before detection runs.
pub const DEBOUNCE: Duration = Duration::from_millis(350);
/// Range changes within this epsilon on both endpoints are no-ops.
pub const RANGE_EPSILON_SECS: f64 = 0.02;
/// Hard cap on the analysis window, for speed and stability.
pub const MAX_ANALYSIS_SECS: f64 = 20.0;

/// A detection run the caller should launch, tagged with its generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    pub range: SampleRange,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Idle,
    Pending { range: SampleRange, deadline: Instant },
    Running,
}

#[derive(Debug)]
pub struct TempoDebounce {
    state: State,
    generation: u64,
    last_range: Option<SampleRange>,
}

impl TempoDebounce {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            generation: 0,
            last_range: None,
        }
    }

    /// Register a range change. Returns `false` when the change is within
    /// epsilon of the last registered range and is dropped as a no-op;
    /// otherwise the debounce deadline is (re)armed.
    pub fn range_changed(&mut self, range: SampleRange, now: Instant) -> bool {
        if let Some(last) = &self.last_range {
            if last.approx_eq(&range, RANGE_EPSILON_SECS) {
                debug!(?range, "range change within epsilon, ignoring");
                return false;
            }
        }
        self.last_range = Some(range);
        self.state = State::Pending {
            range: range.capped(MAX_ANALYSIS_SECS),
            deadline: now + DEBOUNCE,
        };
        true
    }

    /// Forget the selection entirely (range cleared).
    pub fn cleared(&mut self) {
        self.state = State::Idle;
        self.last_range = None;
    }

    /// Deadline the caller should sleep until, if a run is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Fire the pending run if its deadline has elapsed. Bumps the
    /// generation so any in-flight completion becomes stale.
    pub fn fire(&mut self, now: Instant) -> Option<Launch> {
        match self.state {
            State::Pending { range, deadline } if now >= deadline => {
                self.generation += 1;
                self.state = State::Running;
                debug!(?range, generation = self.generation, "launching detection");
                Some(Launch {
                    range,
                    generation: self.generation,
                })
            }
            _ => None,
        }
    }

    /// Report a run completion. Returns `true` when the result should be
    /// published, `false` when it is stale and must be discarded.
    pub fn completed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding stale detection result"
            );
            return false;
        }
        if self.state == State::Running {
            self.state = State::Idle;
        }
        true
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for TempoDebounce {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: f64, end: f64) -> SampleRange {
        SampleRange::new(start, end)
    }

    #[test]
    fn rapid_changes_collapse_to_last_range() {
        let mut machine = TempoDebounce::new();
        let t0 = Instant::now();

        assert!(machine.range_changed(range(0.0, 5.0), t0));
        assert!(machine.range_changed(range(1.0, 6.0), t0 + Duration::from_millis(100)));
        assert!(machine.range_changed(range(2.0, 7.0), t0 + Duration::from_millis(200)));

        // Nothing fires before the quiet period after the *last* change.
        assert_eq!(machine.fire(t0 + Duration::from_millis(400)), None);

        let launch = machine.fire(t0 + Duration::from_millis(200) + DEBOUNCE).unwrap();
        assert_eq!(launch.range, range(2.0, 7.0));
        assert_eq!(launch.generation, 1);

        // Exactly one launch for the burst.
        assert_eq!(machine.fire(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn epsilon_changes_are_noops() {
        let mut machine = TempoDebounce::new();
        let t0 = Instant::now();

        assert!(machine.range_changed(range(1.0, 2.0), t0));
        let fired = machine.fire(t0 + DEBOUNCE).unwrap();
        assert_eq!(fired.generation, 1);

        // 15 ms wiggle on one endpoint: no new run.
        assert!(!machine.range_changed(range(1.015, 2.0), t0 + DEBOUNCE));
        assert_eq!(machine.next_deadline(), None);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut machine = TempoDebounce::new();
        let t0 = Instant::now();

        machine.range_changed(range(0.0, 5.0), t0);
        let first = machine.fire(t0 + DEBOUNCE).unwrap();

        machine.range_changed(range(8.0, 15.0), t0 + DEBOUNCE);
        let second = machine.fire(t0 + DEBOUNCE + DEBOUNCE).unwrap();
        assert_eq!(second.generation, first.generation + 1);

        // The newer result lands first; the older one must be dropped even
        // though it completes later.
        assert!(machine.completed(second.generation));
        assert!(!machine.completed(first.generation));
    }

    #[test]
    fn long_selection_is_capped() {
        let mut machine = TempoDebounce::new();
        let t0 = Instant::now();

        machine.range_changed(range(10.0, 90.0), t0);
        let launch = machine.fire(t0 + DEBOUNCE).unwrap();
        assert_eq!(launch.range.start_secs, 10.0);
        assert_eq!(launch.range.end_secs, 10.0 + MAX_ANALYSIS_SECS);
    }

    #[test]
    fn cleared_forgets_the_last_range() {
        let mut machine = TempoDebounce::new();
        let t0 = Instant::now();

        machine.range_changed(range(1.0, 2.0), t0);
        machine.cleared();
        assert_eq!(machine.next_deadline(), None);

        // Re-selecting the same range after a clear is a real change.
        assert!(machine.range_changed(range(1.0, 2.0), t0 + DEBOUNCE));
    }
}
