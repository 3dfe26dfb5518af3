//! Error types for HealthAI core

use thiserror::Error;

/// Errors that can occur while fetching, aggregating, or chatting
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid window: {0} days (must be between 1 and 36525)")]
    InvalidWindow(usize),

    #[error("Failed to parse readings: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    #[error("Metric source failed: {0}")]
    SourceError(String),

    #[error("Insight service failed: {0}")]
    InsightError(String),

    #[error("Metric store lock poisoned")]
    StorePoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
