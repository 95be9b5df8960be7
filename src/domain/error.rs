//! Error taxonomy shared by the engine, the remote delegate and the transports.

use thiserror::Error;

/// Errors produced while serving a record operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrmError {
    /// Malformed or invalid input (bad tablename, wrong type, empty filter).
    #[error("{0}")]
    Validation(String),

    /// One or more required fields were absent or empty.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The addressed record does not exist in its table.
    #[error("{0}")]
    NotFound(String),

    /// The remote CRM call failed; carries the upstream message unmodified.
    #[error("{0}")]
    Remote(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CrmError {
    pub fn validation(message: impl Into<String>) -> Self {
        CrmError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CrmError::NotFound(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        CrmError::Remote(message.into())
    }

    /// HTTP status code the REST binding reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CrmError::Validation(_) | CrmError::MissingFields(_) => 400,
            CrmError::NotFound(_) => 404,
            CrmError::Remote(_) | CrmError::Internal(_) => 500,
        }
    }

    /// True when the caller sent something we could not serve (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

pub type CrmResult<T> = Result<T, CrmError>;
