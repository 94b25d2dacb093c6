use crate::persistence::PersistenceError;
use thiserror::Error;

/// Rejected form input. Nothing is written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid hours '{0}' (expected a decimal number)")]
    InvalidHours(String),
    #[error("hours must not be negative (got {0})")]
    NegativeHours(String),
    #[error("effort type is derived from the category in this profile")]
    EffortLocked,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
pub enum TimesheetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no entry with id {0}")]
    NotFound(String),
    #[error("id prefix '{0}' matches more than one record")]
    AmbiguousId(String),
    #[error("{0} is not enabled for this profile")]
    FeatureDisabled(&'static str),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

pub type TimesheetResult<T> = Result<T, TimesheetError>;
