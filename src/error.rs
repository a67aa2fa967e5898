use chrono::NaiveDate;
use thiserror::Error;

use std::fmt;

/// Person fields that carry a format rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    BirthDate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::FirstName => "first name",
            Field::LastName => "last name",
            Field::BirthDate => "birth date",
        };
        f.write_str(name)
    }
}

/// Validation failures raised before any I/O is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersonError {
    #[error("id cannot be negative, got {0}")]
    InvalidId(i64),

    #[error("{0} cannot be empty")]
    EmptyField(Field),

    #[error("{field} may only contain letters, got `{value}`")]
    InvalidFormat { field: Field, value: String },

    #[error("birth date {0} is in the future")]
    FutureDate(NaiveDate),

    #[error("birth date {0} is before 1900-01-01")]
    TooOld(NaiveDate),
}

/// Failures originating from the connection or statement execution layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable while {operation}: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub(crate) fn unavailable(operation: &'static str, source: sqlx::Error) -> Self {
        tracing::error!("Store operation failed while {}: {:?}", operation, source);
        StoreError::StoreUnavailable { operation, source }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required setting {0} is not set")]
    Missing(&'static str),

    #[error("could not load environment file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("csv error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("no person with id {0}")]
    NotFound(i64),

    #[error("invalid new value: {0}")]
    Invalid(PersonError),

    #[error("stored person is malformed, supply a corrected value: {0}")]
    StillMalformed(PersonError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
