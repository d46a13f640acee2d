//! Access-control configuration.
//!
//! Configuration is loaded from environment variables with defaults that run
//! the built-in CRM policy with decision auditing on.

use std::path::PathBuf;
use std::sync::Arc;

use crm_rbac::{shared_default_policy, PolicyTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AccessResult;

/// Environment variable naming a JSON policy document.
pub const POLICY_PATH_VAR: &str = "CRM_POLICY_PATH";
/// Environment variable toggling decision audit logging.
pub const AUDIT_DECISIONS_VAR: &str = "CRM_AUDIT_DECISIONS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Access-control configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Policy document to load instead of the built-in table.
    pub policy_path: Option<PathBuf>,

    /// Whether guards emit an audit log line per decision.
    #[serde(default = "default_audit")]
    pub audit_decisions: bool,
}

fn default_audit() -> bool {
    true
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessConfig {
    /// Default configuration: built-in policy, auditing on.
    pub fn new() -> Self {
        Self {
            policy_path: None,
            audit_decisions: default_audit(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CRM_POLICY_PATH`: JSON policy document (default: built-in policy)
    /// - `CRM_AUDIT_DECISIONS`: `true`/`false`/`1`/`0` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let policy_path = lookup(POLICY_PATH_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let audit_decisions = match lookup(AUDIT_DECISIONS_VAR) {
            None => default_audit(),
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: AUDIT_DECISIONS_VAR.to_string(),
                message: format!("expected true or false, got '{}'", raw),
            })?,
        };

        Ok(Self {
            policy_path,
            audit_decisions,
        })
    }

    /// Set the policy document path.
    pub fn with_policy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_path = Some(path.into());
        self
    }

    /// Enable or disable decision auditing.
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_decisions = enabled;
        self
    }

    /// Build the policy table this configuration points at.
    ///
    /// Malformed documents fail here, at startup, rather than at check time.
    pub fn load_policy(&self) -> AccessResult<Arc<PolicyTable>> {
        match &self.policy_path {
            Some(path) => Ok(Arc::new(PolicyTable::from_path(path)?)),
            None => {
                let table = shared_default_policy();
                tracing::info!(
                    version = table.version(),
                    fingerprint = %table.fingerprint(),
                    "Using built-in policy"
                );
                Ok(table)
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
