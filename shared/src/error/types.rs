//! Error value

use super::codes::ErrorCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Domain error: a code, a message for the user and optional context
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Context such as the offending id or field
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    // ==================== Shorthands ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `"{what} not found"`, with `what` kept as the `resource` detail
    pub fn not_found(what: impl Into<String>) -> Self {
        let what = what.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", what)).with_detail("resource", what)
    }

    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidFormat, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::RemoteError, msg)
    }

    pub fn stale_state(state: impl Into<String>) -> Self {
        let state = state.into();
        Self::with_message(ErrorCode::StateStale, format!("Current state \"{}\" not found", state))
            .with_detail("state", state)
    }

    pub fn table_not_found(id: i64) -> Self {
        Self::with_message(ErrorCode::TableNotFound, format!("Table {} not found", id)).with_detail("table_id", id)
    }

    pub fn file(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::FileError, msg)
    }

    /// Input rejected locally, before anything reached the POS
    pub fn is_validation(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ValidationFailed
                | ErrorCode::ValueOutOfRange
                | ErrorCode::RequiredField
                | ErrorCode::CapacityInvalid
                | ErrorCode::PositionUnavailable
                | ErrorCode::PositionOccupied
                | ErrorCode::CapacityReached
                | ErrorCode::TableLocked
                | ErrorCode::ChairSettled
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_format(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::file(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
