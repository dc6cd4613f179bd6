//! Common error types for the exam schedule resolver

use thiserror::Error;

/// Common result type for schedule operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the matcher, the schedule builder and the loaders
#[derive(Error, Debug)]
pub enum Error {
    /// Best-match requested against an empty candidate list
    #[error("No candidates to match against")]
    EmptyCandidateSet,

    /// Schedule table does not have the expected shape
    #[error("Schedule format error: {0}")]
    ScheduleFormat(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schedule file could not be decoded
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
