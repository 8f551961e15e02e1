use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed {entity} record at index {index}: {reason}")]
    MalformedRecord {
        entity: &'static str,
        index: usize,
        reason: String,
    },

    #[error("Funnel violation at hub '{hub}' on {date}: {detail}")]
    FunnelViolation {
        hub: String,
        date: NaiveDate,
        detail: String,
    },

    #[error("Role '{role}' may not view scope {requested}")]
    ScopeNotPermitted { role: String, requested: String },

    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PulseResult<T> = Result<T, PulseError>;
