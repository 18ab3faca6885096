pub mod clip;
pub mod envelope;
pub mod error;
pub mod estimator;
pub mod io;

pub use clip::PcmClip;
pub use envelope::{onset_envelope, rms_envelope, ENERGY_HOP, ENERGY_WINDOW, MIN_ONSET_FRAMES};
pub use error::AudioError;
pub use estimator::{estimate_tempo, MAX_BPM, MIN_BPM};
pub use io::AudioDecoder;
