//! Domain-level error taxonomy.
//!
//! These errors are transport agnostic. The inbound HTTP adapter maps them
//! to status codes and response bodies; the domain only records which
//! failure category applies and a human-readable message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable machine-readable code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Field-level validation failed before the core logic ran.
    ValidationFailed,
    /// A referenced entity (e.g. a todo's owner) does not exist.
    InvalidReference,
    /// A primary-key lookup missed an entity expected to exist.
    NotFound,
    /// A uniqueness invariant would be violated by the write.
    Conflict,
    /// Any unexpected failure, including unclassified storage errors.
    Internal,
}

/// Domain error payload.
///
/// Carries the taxonomy code, a message for the client, and, for
/// [`ErrorCode::ValidationFailed`], the per-field violation map. Violations
/// use a [`BTreeMap`] so repeated runs produce the same field ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    violations: Option<BTreeMap<String, String>>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            violations: None,
        }
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidReference`].
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidReference, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Build a validation failure from a field-to-message violation map.
    pub fn validation_failed(violations: BTreeMap<String, String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: "Validation failed".to_owned(),
            violations: Some(violations),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Per-field violations for validation failures.
    pub fn violations(&self) -> Option<&BTreeMap<String, String>> {
        self.violations.as_ref()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
