use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{resource} returned {code}: {message}")]
    Status {
        resource: String,
        code: u16,
        message: String,
    },
    #[error("request to {resource} failed: {message}")]
    Transport { resource: String, message: String },
    #[error("invalid response from {resource}: {message}")]
    Decode { resource: String, message: String },
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status of the failure, when the service answered at all.
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
