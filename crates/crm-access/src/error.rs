//! Error types for access checks
//!
//! This module defines the errors a route guard or renderer can surface to
//! its caller, with the HTTP status and error code each maps to.

use crm_rbac::PolicyError;
use thiserror::Error;

use crate::config::ConfigError;

/// Access error types.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Actor may not perform the action
    #[error("Forbidden: cannot {action} {resource}")]
    Forbidden {
        /// Resource name
        resource: String,
        /// Action name
        action: String,
    },

    /// Actor's role string is not a known role
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Policy could not be built or loaded, or an entity could not be filtered
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for access operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected outcomes and are not server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AccessError::Policy(_) | AccessError::Config(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Forbidden { .. } | AccessError::UnknownRole(_) => 403,
            AccessError::Policy(_) | AccessError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::Forbidden { .. } => "FORBIDDEN",
            AccessError::UnknownRole(_) => "UNKNOWN_ROLE",
            AccessError::Policy(_) => "POLICY_ERROR",
            AccessError::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_mapping() {
        let err = AccessError::Forbidden {
            resource: "deals".into(),
            action: "delete".into(),
        };
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(!err.is_server_error());
        assert_eq!(err.to_string(), "Forbidden: cannot delete deals");
    }

    #[test]
    fn test_unknown_role_is_forbidden() {
        let err = AccessError::UnknownRole("admn".into());
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "UNKNOWN_ROLE");
    }

    #[test]
    fn test_policy_errors_are_server_errors() {
        let err = AccessError::from(PolicyError::NotAnObject);
        assert_eq!(err.status_code(), 500);
        assert!(err.is_server_error());

        let err = AccessError::from(ConfigError::InvalidValue {
            key: "CRM_AUDIT_DECISIONS".into(),
            message: "expected true or false".into(),
        });
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.is_server_error());
    }
}
