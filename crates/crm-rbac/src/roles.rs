//! # Roles
//!
//! Access classes for CRM users. Roles are flat: each non-admin role has its
//! own independently declared rules, and `Admin` is a universal override.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The acting user's access class.
///
/// Unlike organization roles, CRM roles are not a strict hierarchy. A
/// `Manager` does not inherit what an `Agent` may do; every rule is declared
/// per role in the policy table. Only `Admin` is special: it bypasses the
/// table entirely.
///
/// # Examples
///
/// ```
/// use crm_rbac::Role;
///
/// assert_eq!(Role::parse("agent"), Some(Role::Agent));
/// assert!(Role::Admin.is_admin());
/// assert!(!Role::Manager.is_admin());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System-wide override, never itself gated.
    Admin,

    /// Team lead: sees financial fields, works on the team's deals.
    Manager,

    /// Sales/support agent: works on records assigned to them.
    Agent,

    /// Read-only access to a narrow set of fields.
    Viewer,
}

impl Role {
    /// Check if this role is the universal override.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Parse role from string representation.
    ///
    /// Only the exact lowercase names match. Session roles go through here,
    /// and a near-miss such as `"Admin"` must fail closed, not be upgraded.
    ///
    /// # Examples
    ///
    /// ```
    /// use crm_rbac::Role;
    ///
    /// assert_eq!(Role::parse("admin"), Some(Role::Admin));
    /// assert_eq!(Role::parse("ADMIN"), None);
    /// assert_eq!(Role::parse("admn"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "agent" => Some(Self::Agent),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Parse a role name from a hand-written policy document.
    ///
    /// Case-insensitive and ignores surrounding whitespace. Never use this for
    /// a role carried by a request.
    ///
    /// ```
    /// use crm_rbac::Role;
    ///
    /// assert_eq!(Role::parse_lenient(" Viewer "), Some(Role::Viewer));
    /// ```
    pub fn parse_lenient(s: &str) -> Option<Self> {
        Self::parse(&s.trim().to_lowercase())
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Agent => "agent",
            Self::Viewer => "viewer",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Manager => "Manager",
            Self::Agent => "Agent",
            Self::Viewer => "Viewer",
        }
    }

    /// Get all roles.
    pub fn all() -> [Self; 4] {
        [Self::Admin, Self::Manager, Self::Agent, Self::Viewer]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
