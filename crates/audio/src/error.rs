use std::path::PathBuf;

use thiserror::Error;

/// Failures of the decoding collaborator.
///
/// These are real errors and stay distinct from "no tempo found", which is a
/// sentinel value, not an error (see `estimator`).
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or malformed audio: {0}")]
    Decode(String),
    #[error("invalid clip: {0}")]
    InvalidClip(String),
}
