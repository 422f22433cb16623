use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by the backend, or on the way to it.
///
/// `Display` is the human-readable message forms show inline.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The backend answered and refused the operation (validation, permission,
    /// bad credentials)
    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Failed to reach backend: {0}")]
    Transport(String),

    #[error("Unexpected response from backend: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        BackendError::Rejected {
            status,
            code: None,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}
