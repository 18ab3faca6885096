use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{error::DomainError, range::SampleRange, stats::TimingStats, tempo::TempoEstimate};

/// Summary of one practice session on one selected range.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PracticeReport {
    pub track: String,
    pub range: SampleRange,
    pub estimate: TempoEstimate,
    pub tap_count: usize,
    /// Absent when the session ended before any tap was scored.
    pub stats: Option<TimingStats>,
    pub recorded_at: OffsetDateTime,
}

impl PracticeReport {
    pub fn new(
        track: impl Into<String>,
        range: SampleRange,
        estimate: TempoEstimate,
        tap_count: usize,
        stats: Option<TimingStats>,
    ) -> Self {
        Self {
            track: track.into(),
            range,
            estimate,
            tap_count,
            stats,
            recorded_at: OffsetDateTime::now_utc(),
        }
    }
}

pub trait ReportExporter {
    fn export(&self, report: &PracticeReport) -> Result<Vec<u8>, DomainError>;
}

pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn export(&self, report: &PracticeReport) -> Result<Vec<u8>, DomainError> {
        serde_json::to_vec_pretty(report).map_err(|err| DomainError::Serialization(err.to_string()))
    }
}
