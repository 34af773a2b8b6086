//! Core error types for FieldTrack RS
//!
//! One taxonomy shared by every engine: connectivity failures abort an
//! operation before any write, per-record validation failures are collected
//! by the caller rather than raised, ownership conflicts are categorization
//! outcomes, and consistency failures indicate a rolled-back transaction.

use thiserror::Error;

/// Core error type for all FieldTrack operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Central store unreachable. Raised before any write happens so the
    /// operation has no partial effects.
    #[error("Cannot reach central store: {message}")]
    Connectivity { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A single record failed a constraint at the store. Batch operations
    /// collect these per record and keep going.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Ownership changed underneath an operation that required it.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Not found: {entity} with key {key}")]
    NotFound {
        entity: &'static str,
        key: String,
    },

    /// A multi-row transaction failed and was rolled back in full.
    #[error("Consistency failure, nothing was applied: {message}")]
    Consistency { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Standard Result type for FieldTrack operations
pub type FtResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn connectivity(message: impl Into<String>) -> Self {
        EngineError::Connectivity {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict {
            message: message.into(),
        }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        EngineError::Consistency {
            message: message.into(),
        }
    }

    /// Whether the error left the stores untouched.
    pub fn is_side_effect_free(&self) -> bool {
        matches!(
            self,
            EngineError::Connectivity { .. }
                | EngineError::NotFound { .. }
                | EngineError::Config(_)
        )
    }

    /// Stable code for operational logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::Connectivity { .. } => "connectivity",
            EngineError::Database(_) => "database_error",
            EngineError::Validation { .. } => "validation_failed",
            EngineError::Conflict { .. } => "conflict",
            EngineError::NotFound { .. } => "not_found",
            EngineError::Consistency { .. } => "consistency_failure",
            EngineError::Cancelled => "cancelled",
            EngineError::Config(_) => "configuration_error",
            EngineError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_is_side_effect_free() {
        let err = EngineError::connectivity("timed out");
        assert!(err.is_side_effect_free());
        assert_eq!(err.error_code(), "connectivity");
    }

    #[test]
    fn test_consistency_message() {
        let err = EngineError::consistency("update of A1 failed");
        assert_eq!(
            err.to_string(),
            "Consistency failure, nothing was applied: update of A1 failed"
        );
    }
}
