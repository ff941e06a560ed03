//! Error types for Oremarket
//!
//! Every lifecycle operation returns a typed success value or one of
//! these errors. Only `Unavailable` is safe to retry; all other kinds are
//! terminal for that call and must be corrected by the caller.

use thiserror::Error;

use crate::ComplianceStatus;

/// Result type for Oremarket operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Oremarket error taxonomy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    /// Bad input shape or range
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Unknown id
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Authorization failure (wrong role or owner)
    #[error("forbidden: {action}: {reason}")]
    Forbidden { action: &'static str, reason: String },

    /// State machine violation
    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Compliance gate failure; carries the user's current status
    #[error("compliance gate blocked {action}: current status is {status}")]
    Compliance {
        action: &'static str,
        status: ComplianceStatus,
    },

    /// Rule violation that is neither bad input nor a state transition
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// Lost a race on a shared resource
    #[error("conflict on {resource}: {reason}")]
    Conflict {
        resource: &'static str,
        reason: String,
    },

    /// External payment failed or was rejected
    #[error("payment failed: {reason}")]
    Payment { reason: String },

    /// Collaborator timed out; safe to retry
    #[error("{operation} is unavailable, retry later")]
    Unavailable { operation: &'static str },
}

impl MarketError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(action: &'static str, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            action,
            reason: reason.into(),
        }
    }

    pub fn invalid_transition(entity: &'static str, from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn conflict(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::Conflict {
            resource,
            reason: reason.into(),
        }
    }

    /// Check if this error is safe to retry
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Get an error code for API surfaces
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Compliance { .. } => "COMPLIANCE_ERROR",
            Self::InvalidOperation { .. } => "INVALID_OPERATION",
            Self::Conflict { .. } => "CONFLICT",
            Self::Payment { .. } => "PAYMENT_ERROR",
            Self::Unavailable { .. } => "UNAVAILABLE",
        }
    }
}
