//! # Actions
//!
//! Operations that can be attempted on a resource. Actions are open-ended
//! verbs matched literally; the only special value is the wildcard `"*"`,
//! which inside a rule means "any action".

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named operation (`read`, `create`, `update`, `delete`, or a custom verb).
///
/// There is no implication between actions: a rule granting
/// `update` does not grant `read`. Only [`Action::ANY`] in a rule matches
/// more than its own literal value.
///
/// # Example
///
/// ```
/// use crm_rbac::Action;
///
/// let any = Action::new(Action::ANY);
/// assert!(any.is_wildcard());
/// assert!(any.permits(&Action::new("archive")));
///
/// let read = Action::new(Action::READ);
/// assert!(read.permits(&Action::new("read")));
/// assert!(!read.permits(&Action::new("update")));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    /// Wildcard marker: any action.
    pub const ANY: &'static str = "*";
    /// View a record or list of records.
    pub const READ: &'static str = "read";
    /// Create a record.
    pub const CREATE: &'static str = "create";
    /// Modify a record.
    pub const UPDATE: &'static str = "update";
    /// Remove a record.
    pub const DELETE: &'static str = "delete";
    /// Download records (CSV export from the dashboard).
    pub const EXPORT: &'static str = "export";
    /// Reassign a record to another user.
    pub const ASSIGN: &'static str = "assign";

    /// Create an action.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the action verb.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::ANY
    }

    /// Check if this granted action covers the requested one.
    ///
    /// # Arguments
    ///
    /// * `requested` - The action being attempted
    ///
    /// # Returns
    ///
    /// `true` if this action is the wildcard or equals `requested` literally
    pub fn permits(&self, requested: &Action) -> bool {
        self.is_wildcard() || self.0 == requested.0
    }

    /// Check if this is a read-only action.
    pub fn is_read_only(&self) -> bool {
        matches!(self.0.as_str(), Self::READ | Self::EXPORT)
    }

    /// Check if this is a destructive action.
    pub fn is_destructive(&self) -> bool {
        self.0 == Self::DELETE
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_matching() {
        let update = Action::new("update");
        assert!(update.permits(&Action::new("update")));
        assert!(!update.permits(&Action::new("read")));
        assert!(!update.permits(&Action::new("Update")));
    }

    #[test]
    fn test_wildcard_permits_everything() {
        let any = Action::new(Action::ANY);
        assert!(any.is_wildcard());
        assert!(any.permits(&Action::new("read")));
        assert!(any.permits(&Action::new("delete")));
        assert!(any.permits(&Action::new("merge_duplicates")));
    }

    #[test]
    fn test_requested_wildcard_is_not_special() {
        // A caller asking for "*" only matches a rule that grants "*".
        let read = Action::new("read");
        assert!(!read.permits(&Action::new(Action::ANY)));
    }

    #[test]
    fn test_is_read_only() {
        assert!(Action::new(Action::READ).is_read_only());
        assert!(Action::new(Action::EXPORT).is_read_only());
        assert!(!Action::new(Action::CREATE).is_read_only());
        assert!(!Action::new(Action::ASSIGN).is_read_only());
    }

    #[test]
    fn test_is_destructive() {
        assert!(Action::new(Action::DELETE).is_destructive());
        assert!(!Action::new(Action::UPDATE).is_destructive());
    }
}
