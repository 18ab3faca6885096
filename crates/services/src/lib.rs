pub mod debounce;
pub mod detector;

pub use debounce::{Launch, TempoDebounce, DEBOUNCE, MAX_ANALYSIS_SECS, RANGE_EPSILON_SECS};
pub use detector::{DetectorHandle, TempoDetector};
