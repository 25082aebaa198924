use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Validation results — always data, never an error channel
// ============================================================================

/// Stable machine-checkable identifier for a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RequiredField,
    InvalidType,
    UnsupportedType,
    InvalidConfig,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::RequiredField => "REQUIRED_FIELD",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::UnsupportedType => "UNSUPPORTED_TYPE",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
        };
        f.write_str(s)
    }
}

/// One structural problem, located by a dotted/bracketed path such as
/// `components[2].children[0].type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    pub code: ErrorCode,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.code, self.path, self.message)
        }
    }
}

/// The full outcome of validating one page configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}
