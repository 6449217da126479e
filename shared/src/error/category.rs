//! Error categories by code range

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Which part of the floor editor an error code belongs to
///
/// - 0xxx: general
/// - 70xx: tables
/// - 71xx: chairs
/// - 72xx: table states
/// - 9xxx and anything unassigned: system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Table,
    Chair,
    State,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            7000..7100 => Self::Table,
            7100..7200 => Self::Chair,
            7200..7300 => Self::State,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Table => "table",
            Self::Chair => "chair",
            Self::State => "state",
            Self::System => "system",
        }
    }

    /// Floor-plan domain errors, as opposed to general or system ones
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Table | Self::Chair | Self::State)
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
