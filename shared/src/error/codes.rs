//! Error codes
//!
//! - 0xxx: general
//! - 70xx: tables, 71xx: chairs, 72xx: table states
//! - 9xxx: system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error code, serialized as its `u16` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    ValidationFailed = 2,
    NotFound = 3,
    /// File or payload does not parse
    InvalidFormat = 6,
    RequiredField = 7,
    ValueOutOfRange = 8,

    // ==================== 70xx: Tables ====================
    TableNotFound = 7001,
    /// Locked tables cannot be moved, resized or rotated
    TableLocked = 7002,
    /// Chairs and states need the table's POS order
    TableHasNoOrder = 7003,
    /// `min > max` capacity
    CapacityInvalid = 7004,

    // ==================== 71xx: Chairs ====================
    /// Slot not in the table's available positions
    PositionUnavailable = 7101,
    PositionOccupied = 7102,
    CapacityReached = 7103,
    ChairNotFound = 7104,
    /// Tab already carries a `[PAID-n]` name
    ChairSettled = 7105,

    // ==================== 72xx: Table states ====================
    /// Vocabulary, location or state holder missing
    StatesMissing = 7201,
    /// Current state not in the vocabulary
    StateStale = 7202,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    /// POS call failed
    RemoteError = 9003,
    FileError = 9006,
}

impl ErrorCode {
    /// Every code, in numeric order
    pub const ALL: [ErrorCode; 19] = [
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::InvalidFormat,
        ErrorCode::RequiredField,
        ErrorCode::ValueOutOfRange,
        ErrorCode::TableNotFound,
        ErrorCode::TableLocked,
        ErrorCode::TableHasNoOrder,
        ErrorCode::CapacityInvalid,
        ErrorCode::PositionUnavailable,
        ErrorCode::PositionOccupied,
        ErrorCode::CapacityReached,
        ErrorCode::ChairNotFound,
        ErrorCode::ChairSettled,
        ErrorCode::StatesMissing,
        ErrorCode::StateStale,
        ErrorCode::InternalError,
        ErrorCode::RemoteError,
        ErrorCode::FileError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Message used when no specific one is given
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field missing",
            ErrorCode::ValueOutOfRange => "Value out of range",

            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableLocked => "Table is locked",
            ErrorCode::TableHasNoOrder => "Table has no order",
            ErrorCode::CapacityInvalid => "Min capacity cannot be greater than max capacity",

            ErrorCode::PositionUnavailable => "Position not available",
            ErrorCode::PositionOccupied => "Position is already occupied",
            ErrorCode::CapacityReached => "Table is at full capacity",
            ErrorCode::ChairNotFound => "Chair not found",
            ErrorCode::ChairSettled => "Chair has already been paid",

            ErrorCode::StatesMissing => "No table states available",
            ErrorCode::StateStale => "Current state not found in table states",

            ErrorCode::InternalError => "Internal error",
            ErrorCode::RemoteError => "Remote call failed",
            ErrorCode::FileError => "File error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A `u16` that is not an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        ErrorCode::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
