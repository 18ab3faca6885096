pub mod error;
pub mod range;
pub mod report;
pub mod stats;
pub mod tempo;

pub use crate::error::DomainError;
pub use crate::range::SampleRange;
pub use crate::report::{JsonExporter, PracticeReport, ReportExporter};
pub use crate::stats::TimingStats;
pub use crate::tempo::{ConfidenceBand, TempoEstimate};
