//! Errors raised while talking to Onslip 360

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body of a successful response did not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 401: Hawk credentials rejected
    #[error("Onslip rejected the API credentials")]
    Unauthorized,

    /// 403
    #[error("Forbidden by Onslip: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400 or 422
    #[error("Rejected by Onslip: {0}")]
    Validation(String),

    /// Any other failure status
    #[error("Onslip error: {0}")]
    Internal(String),

    /// Base URL, realm or path do not form a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request could not be signed
    #[error("Hawk signing failed: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether Onslip reported the entity as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ClientError::NotFound("tabs/4".into()).is_not_found());
        assert!(!ClientError::Unauthorized.is_not_found());
        assert_eq!(
            ClientError::Validation("name is required".into()).to_string(),
            "Rejected by Onslip: name is required"
        );
    }
}
