// errors.rs
use astra::Response;

use crate::db::StoreError;
use crate::domain::ValidationError;

/// Errors surfaced at the HTTP boundary.
///
/// Store-layer faults are classified into one of these before they reach a
/// response; raw driver errors never leave this module.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The store is unconfigured or not connected.
    #[error("{0}")]
    ServiceUnavailable(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    ValidationRejected(#[from] ValidationError),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Detail is for the log only.
    #[error("Internal server error")]
    InternalFault(String),
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::ServiceUnavailable(_) => 503,
            ServerError::NotFound(_) => 404,
            ServerError::ValidationRejected(_) | ServerError::BadRequest(_) => 400,
            ServerError::InternalFault(_) => 500,
        }
    }

    /// The message a caller is allowed to see.
    pub fn public_message(&self) -> String {
        self.to_string()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unconfigured => ServerError::ServiceUnavailable("Database not available"),
            StoreError::Disconnected => ServerError::ServiceUnavailable("Database not connected"),
            other => ServerError::InternalFault(other.to_string()),
        }
    }
}
