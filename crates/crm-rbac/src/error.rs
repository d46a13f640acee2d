//! Error types for policy construction
//!
//! Evaluation never fails; these errors only arise while building or loading
//! a policy table, or when an entity cannot be viewed as a field map.

use thiserror::Error;

/// Policy construction and loading errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The same (role, resource) pair was declared twice
    #[error("duplicate rule for role '{role}' on resource '{resource}'")]
    DuplicateRule {
        /// Role name
        role: String,
        /// Resource name
        resource: String,
    },

    /// Admin is a universal override and must not appear in the table
    #[error("rule declared for admin on resource '{0}'; admin bypasses the policy table")]
    AdminRule(String),

    /// Role name in a policy document is not a known role
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    /// Empty resource name
    #[error("empty resource name for role '{0}'")]
    EmptyResource(String),

    /// Rule grants no actions
    #[error("rule for role '{role}' on resource '{resource}' grants no actions")]
    NoActions {
        /// Role name
        role: String,
        /// Resource name
        resource: String,
    },

    /// Empty action name
    #[error("empty action in rule for role '{role}' on resource '{resource}'")]
    EmptyAction {
        /// Role name
        role: String,
        /// Resource name
        resource: String,
    },

    /// Malformed field list (empty name, or "*" mixed with named fields)
    #[error("invalid field list for role '{role}' on resource '{resource}': {message}")]
    InvalidFields {
        /// Role name
        role: String,
        /// Resource name
        resource: String,
        /// What is wrong with the list
        message: String,
    },

    /// Invalid always-visible field name
    #[error("invalid always-visible field '{0}'")]
    InvalidAlwaysVisible(String),

    /// Entity did not serialize to a JSON object
    #[error("entity is not an object")]
    NotAnObject,

    /// Policy document could not be parsed
    #[error("invalid policy document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Policy document could not be read
    #[error("failed to read policy document: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

impl PolicyError {
    /// Check if this error comes from the table contents rather than I/O or parsing.
    pub fn is_malformed_policy(&self) -> bool {
        !matches!(
            self,
            PolicyError::NotAnObject | PolicyError::Parse(_) | PolicyError::Io(_)
        )
    }

    /// Get error code for API responses and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            PolicyError::DuplicateRule { .. } => "DUPLICATE_RULE",
            PolicyError::AdminRule(_) => "ADMIN_RULE",
            PolicyError::UnknownRole(_) => "UNKNOWN_ROLE",
            PolicyError::EmptyResource(_) => "EMPTY_RESOURCE",
            PolicyError::NoActions { .. } => "NO_ACTIONS",
            PolicyError::EmptyAction { .. } => "EMPTY_ACTION",
            PolicyError::InvalidFields { .. } => "INVALID_FIELDS",
            PolicyError::InvalidAlwaysVisible(_) => "INVALID_ALWAYS_VISIBLE",
            PolicyError::NotAnObject => "NOT_AN_OBJECT",
            PolicyError::Parse(_) => "PARSE_ERROR",
            PolicyError::Io(_) => "IO_ERROR",
        }
    }
}
