use thiserror::Error;

pub type PortalResult<T> = std::result::Result<T, PortalError>;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("could not read server response: {0}")]
    Decode(String),

    #[error("session store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("cancelled by user")]
    Cancelled,
}

/// Coarse error class used to pick what the user sees next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authorization,
    Transient,
    Local,
}

impl PortalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PortalError::Validation(_) | PortalError::Cancelled => ErrorCategory::Validation,
            PortalError::SessionExpired => ErrorCategory::Authorization,
            PortalError::Api { .. } | PortalError::Network(_) | PortalError::Decode(_) => {
                ErrorCategory::Transient
            }
            PortalError::Store(_) => ErrorCategory::Local,
        }
    }

    pub fn is_retriable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PortalError::Api { status, .. } => Some(*status),
            PortalError::SessionExpired => Some(401),
            _ => None,
        }
    }
}

/// Form problems detected client-side. Never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Please select a batch")]
    MissingBatch,

    #[error("Please select a student")]
    MissingStudent,

    #[error("{field} must be a date in YYYY-MM-DD format")]
    InvalidDate { field: &'static str },

    #[error("{0}")]
    Invalid(String),
}
