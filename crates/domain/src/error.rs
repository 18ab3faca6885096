use thiserror::Error;

/// Errors raised by the domain layer itself. Analysis failures are expressed
/// as sentinel values (`TempoEstimate::NONE`, `None` stats), not as errors.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("report serialization failed: {0}")]
    Serialization(String),
}
