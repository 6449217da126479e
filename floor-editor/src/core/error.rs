use onslip_client::ClientError;
use shared::error::{AppError, ErrorCategory, ErrorCode};
use shared::state::StateError;
use thiserror::Error;

/// How a failed operation should be surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity missing locally or remotely
    NotFound,
    /// Input rejected before any remote call
    Validation,
    /// Network or POS failure
    Remote,
    /// Current state not in the vocabulary
    StaleState,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("POS request failed: {0}")]
    Client(#[from] ClientError),
}

impl From<StateError> for ServiceError {
    fn from(err: StateError) -> Self {
        ServiceError::App(err.into())
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::App(err) => match err.code {
                ErrorCode::NotFound | ErrorCode::TableNotFound | ErrorCode::ChairNotFound => ErrorKind::NotFound,
                ErrorCode::StateStale => ErrorKind::StaleState,
                code if code.category() == ErrorCategory::System => ErrorKind::Remote,
                _ => ErrorKind::Validation,
            },
            ServiceError::Client(err) => match err {
                ClientError::NotFound(_) => ErrorKind::NotFound,
                ClientError::Validation(_) => ErrorKind::Validation,
                _ => ErrorKind::Remote,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::App(err) => err.code,
            ServiceError::Client(ClientError::NotFound(_)) => ErrorCode::NotFound,
            ServiceError::Client(ClientError::Validation(_)) => ErrorCode::ValidationFailed,
            ServiceError::Client(_) => ErrorCode::RemoteError,
        }
    }
}

/// Result alias for service and session operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
