// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use tutor_ledger::CoreError;
use tutor_ledger_domain::DomainError;
use tutor_ledger_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The acting account could not be resolved.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The role may not perform the operation on this resource.
    #[error("Unauthorized: {role} may not {operation}")]
    Unauthorized {
        /// The operation that was attempted.
        operation: String,
        /// The role of the actor.
        role: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The operation that was attempted.
        operation: String,
        /// The role of the actor.
        role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A unique or foreign-key constraint rejected the write.
    IntegrityViolation {
        /// The database's description of the violation.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { operation, role } => {
                write!(f, "Unauthorized: {role} may not {operation}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::IntegrityViolation { message } => {
                write!(f, "Integrity violation: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized { operation, role } => Self::Unauthorized { operation, role },
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn violation(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::MissingManualHours | DomainError::NegativeManualHours { .. } => {
            invalid("manual_hours", message)
        }
        DomainError::MissingClockIn => invalid("clock_in", message),
        DomainError::MissingTimeRangeBound => invalid("time_range", message),
        DomainError::EndNotAfterStart { .. } => invalid("end", message),
        DomainError::InvalidEntryType(_) => invalid("entry_type", message),
        DomainError::NotClockSession { .. } => violation("close_clock_sessions_only", message),
        DomainError::SessionAlreadyClosed { .. } => violation("close_once", message),
        DomainError::SessionDeleted { .. } => violation("deleted_sessions_are_frozen", message),
        DomainError::InvalidMonth(_)
        | DomainError::InvalidMonthLabel(_)
        | DomainError::UnresolvableMonthBoundary { .. }
        | DomainError::DateArithmeticOverflow { .. } => invalid("month", message),
        DomainError::InvalidYear(_) => invalid("year", message),
        DomainError::InvalidTimeZone(_) => invalid("timezone", message),
        DomainError::NonPositiveQuantity { .. } => invalid("quantity", message),
        DomainError::NegativePrice { .. } => invalid("price", message),
        DomainError::AmountOverflow { .. } => invalid("amount", message),
        DomainError::InvalidDecimal { field, .. } => ApiError::InvalidInput { field, message },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        other @ CoreError::EmptyInterval { .. } => ApiError::InvalidInput {
            field: String::from("interval"),
            message: other.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Rejected(domain_err) => translate_domain_error(domain_err),
        PersistenceError::Aggregation(core_err) => translate_core_error(core_err),
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::IntegrityViolation(message) => ApiError::IntegrityViolation { message },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
