//! Async tempo detection driven by range-selection events.
//!
//! A single task owns the debounce machine and the result channel, so there
//! is no shared mutable state and no locking; cancellation is cooperative
//! through the generation token carried by each run.

use std::sync::Arc;

use cadence_audio::{estimate_tempo, PcmClip};
use cadence_domain::{SampleRange, TempoEstimate};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::debounce::TempoDebounce;

/// Estimation entry point; swappable so tests can observe launches.
pub type Estimator = Arc<dyn Fn(&PcmClip, &SampleRange) -> TempoEstimate + Send + Sync>;

enum Command {
    Select(SampleRange),
    Clear,
}

pub struct TempoDetector;

impl TempoDetector {
    /// Spawn the detection task for one decoded clip.
    pub fn spawn(clip: Arc<PcmClip>) -> DetectorHandle {
        Self::spawn_with_estimator(clip, Arc::new(|clip, range| estimate_tempo(clip, range)))
    }

    pub fn spawn_with_estimator(clip: Arc<PcmClip>, estimator: Estimator) -> DetectorHandle {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = watch::channel(None);

        tokio::spawn(async move {
            let mut machine = TempoDebounce::new();
            let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(u64, TempoEstimate)>();

            loop {
                let deadline = machine.next_deadline();
                tokio::select! {
                    command = command_rx.recv() => match command {
                        Some(Command::Select(range)) => {
                            machine.range_changed(range, Instant::now());
                        }
                        Some(Command::Clear) => {
                            machine.cleared();
                            let _ = result_tx.send(None);
                        }
                        // All handles dropped; shut down.
                        None => break,
                    },
                    _ = async { sleep_until(deadline.unwrap()).await }, if deadline.is_some() => {
                        if let Some(launch) = machine.fire(Instant::now()) {
                            let clip = Arc::clone(&clip);
                            let estimator = Arc::clone(&estimator);
                            let done = done_tx.clone();
                            tokio::task::spawn_blocking(move || {
                                let estimate = estimator(&clip, &launch.range);
                                if done.send((launch.generation, estimate)).is_err() {
                                    warn!("detector task gone before completion");
                                }
                            });
                        }
                    },
                    completion = done_rx.recv() => {
                        // done_tx lives on this task, so recv never yields None here.
                        if let Some((generation, estimate)) = completion {
                            if machine.completed(generation) {
                                debug!(generation, bpm = estimate.bpm, "publishing tempo estimate");
                                let _ = result_tx.send(Some(estimate));
                            }
                        }
                    }
                }
            }
        });

        DetectorHandle {
            commands: command_tx,
            results: result_rx,
        }
    }
}

/// Caller-side handle: feed range selections in, watch estimates come out.
#[derive(Clone)]
pub struct DetectorHandle {
    commands: mpsc::UnboundedSender<Command>,
    results: watch::Receiver<Option<TempoEstimate>>,
}

impl DetectorHandle {
    /// Report a new range selection. Safe to call at drag frequency; the
    /// service debounces and deduplicates.
    pub fn select(&self, range: SampleRange) {
        let _ = self.commands.send(Command::Select(range));
    }

    /// Clear the selection and the published estimate.
    pub fn clear(&self) {
        let _ = self.commands.send(Command::Clear);
    }

    /// Watch channel carrying the latest accepted estimate.
    pub fn results(&self) -> watch::Receiver<Option<TempoEstimate>> {
        self.results.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::debounce::DEBOUNCE;

    fn test_clip() -> Arc<PcmClip> {
        Arc::new(PcmClip::new(44_100, vec![vec![0.0; 44_100 * 30]]).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_selections_runs_once_for_the_last() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let estimator: Estimator = {
            let calls = Arc::clone(&calls);
            let seen = Arc::clone(&seen);
            Arc::new(move |_clip, range| {
                calls.fetch_add(1, Ordering::SeqCst);
                seen.lock().unwrap().push(*range);
                TempoEstimate::new(128, 0.9)
            })
        };

        let handle = TempoDetector::spawn_with_estimator(test_clip(), estimator);
        let mut results = handle.results();

        handle.select(SampleRange::new(0.0, 5.0));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.select(SampleRange::new(1.0, 6.0));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.select(SampleRange::new(2.0, 7.0));

        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        results.changed().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let ranges = seen.lock().unwrap();
        assert_eq!(ranges.as_slice(), &[SampleRange::new(2.0, 7.0)]);
        assert_eq!(*results.borrow(), Some(TempoEstimate::new(128, 0.9)));
    }

    #[tokio::test(start_paused = true)]
    async fn epsilon_reselect_does_not_rerun() {
        let calls = Arc::new(AtomicUsize::new(0));
        let estimator: Estimator = {
            let calls = Arc::clone(&calls);
            Arc::new(move |_clip, _range| {
                calls.fetch_add(1, Ordering::SeqCst);
                TempoEstimate::new(120, 0.5)
            })
        };

        let handle = TempoDetector::spawn_with_estimator(test_clip(), estimator);
        let mut results = handle.results();

        handle.select(SampleRange::new(3.0, 9.0));
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        results.changed().await.unwrap();

        // 10 ms wiggle on the start endpoint: treated as the same selection.
        handle.select(SampleRange::new(3.01, 9.0));
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_stale_result_cannot_overwrite_newer_one() {
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let calls = Arc::new(AtomicUsize::new(0));

        let estimator: Estimator = {
            let calls = Arc::clone(&calls);
            Arc::new(move |_clip, range| {
                calls.fetch_add(1, Ordering::SeqCst);
                if range.start_secs == 0.0 {
                    // The first selection stalls until the test releases it.
                    release_rx.lock().unwrap().recv().unwrap();
                    TempoEstimate::new(170, 0.9)
                } else {
                    TempoEstimate::new(90, 0.6)
                }
            })
        };

        let handle = TempoDetector::spawn_with_estimator(test_clip(), estimator);
        let mut results = handle.results();

        handle.select(SampleRange::new(0.0, 5.0));
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;

        handle.select(SampleRange::new(10.0, 15.0));
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        results.changed().await.unwrap();
        assert_eq!(
            *results.borrow_and_update(),
            Some(TempoEstimate::new(90, 0.6))
        );

        // Let the stalled first run finish now; its generation is behind.
        release_tx.send(()).unwrap();
        for _ in 0..50 {
            std::thread::sleep(Duration::from_millis(1));
            tokio::task::yield_now().await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!results.has_changed().unwrap());
        assert_eq!(*results.borrow(), Some(TempoEstimate::new(90, 0.6)));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_resets_the_published_estimate() {
        let estimator: Estimator = Arc::new(|_clip, _range| TempoEstimate::new(140, 0.8));
        let handle = TempoDetector::spawn_with_estimator(test_clip(), estimator);
        let mut results = handle.results();

        handle.select(SampleRange::new(0.0, 4.0));
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        results.changed().await.unwrap();
        assert!(results.borrow().is_some());

        handle.clear();
        results.changed().await.unwrap();
        assert_eq!(*results.borrow(), None);
    }
}
