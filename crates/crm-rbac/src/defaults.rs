//! # Built-in CRM Policy
//!
//! The rules the back office ships with. The table is built on first access
//! and lives for the rest of the process; changing access rules means editing
//! this file (or deploying a policy document, see `crm-access`) and
//! redeploying.

use std::sync::{Arc, LazyLock};

use crate::actions::Action;
use crate::condition::Condition;
use crate::error::PolicyResult;
use crate::policy::{PermissionRule, PolicyTable};
use crate::resources::CrmResource;
use crate::roles::Role;

/// Version of the built-in policy. Bump on every rule change.
pub const DEFAULT_POLICY_VERSION: u32 = 3;

/// Fields that carry money or HR data.
pub const SENSITIVE_FIELDS: &[&str] = &["revenue", "value", "salary"];

static DEFAULT_POLICY: LazyLock<Arc<PolicyTable>> = LazyLock::new(|| match build_default_policy() {
    Ok(table) => Arc::new(table),
    // A malformed built-in table is a programmer error; refuse to start.
    Err(e) => panic!("built-in CRM policy is malformed: {e}"),
});

/// The process-wide built-in policy table.
pub fn default_policy() -> &'static PolicyTable {
    &DEFAULT_POLICY
}

/// Handle on the process-wide built-in table, for holders that need an `Arc`.
pub fn shared_default_policy() -> Arc<PolicyTable> {
    Arc::clone(&DEFAULT_POLICY)
}

/// Build a fresh copy of the built-in table.
pub fn build_default_policy() -> PolicyResult<PolicyTable> {
    use Action as A;
    use CrmResource as R;

    PolicyTable::builder()
        .version(DEFAULT_POLICY_VERSION)
        // Manager
        .rule(
            Role::Manager,
            R::Accounts,
            PermissionRule::new([A::READ, A::CREATE, A::UPDATE, A::EXPORT]).fields([
                "id",
                "legalName",
                "tradeName",
                "industry",
                "email",
                "phone",
                "website",
                "revenue",
                "employeeCount",
                "ownerId",
                "createdAt",
            ]),
        )
        .rule(Role::Manager, R::Contacts, PermissionRule::new([A::ANY]).all_fields())
        .rule(
            Role::Manager,
            R::Deals,
            PermissionRule::new([A::READ, A::CREATE, A::UPDATE, A::DELETE])
                .fields([
                    "id",
                    "title",
                    "value",
                    "stage",
                    "probability",
                    "accountId",
                    "assignedTo",
                    "teamId",
                    "expectedCloseDate",
                ])
                .when(Condition::SameTeam),
        )
        .rule(
            Role::Manager,
            R::Tickets,
            PermissionRule::new([A::READ, A::CREATE, A::UPDATE, A::ASSIGN]).all_fields(),
        )
        .rule(
            Role::Manager,
            R::ClientRequests,
            PermissionRule::new([A::READ, A::UPDATE, A::ASSIGN]).all_fields(),
        )
        .rule(
            Role::Manager,
            R::Leads,
            PermissionRule::new([A::READ, A::UPDATE, A::ASSIGN, A::EXPORT]).all_fields(),
        )
        .rule(
            Role::Manager,
            R::Users,
            PermissionRule::new([A::READ]).fields(["id", "name", "email", "role", "teamId"]),
        )
        // Agent
        .rule(
            Role::Agent,
            R::Accounts,
            PermissionRule::new([A::READ]).fields([
                "legalName",
                "tradeName",
                "industry",
                "email",
                "phone",
                "website",
            ]),
        )
        .rule(
            Role::Agent,
            R::Contacts,
            PermissionRule::new([A::READ, A::CREATE, A::UPDATE]).fields([
                "id",
                "firstName",
                "lastName",
                "email",
                "phone",
                "accountId",
                "assignedTo",
            ]),
        )
        .rule(
            Role::Agent,
            R::Deals,
            PermissionRule::new([A::READ, A::UPDATE])
                .fields([
                    "id",
                    "title",
                    "stage",
                    "accountId",
                    "assignedTo",
                    "expectedCloseDate",
                ])
                .when(Condition::AssignedToSelf),
        )
        .rule(
            Role::Agent,
            R::Tickets,
            PermissionRule::new([A::READ, A::CREATE, A::UPDATE])
                .all_fields()
                .when(Condition::AssignedToSelf),
        )
        .rule(
            Role::Agent,
            R::ClientRequests,
            PermissionRule::new([A::READ, A::UPDATE])
                .fields([
                    "id",
                    "name",
                    "email",
                    "phone",
                    "service",
                    "message",
                    "status",
                    "assignedTo",
                    "createdAt",
                ])
                .when(Condition::AssignedToSelf),
        )
        .rule(
            Role::Agent,
            R::Leads,
            PermissionRule::new([A::READ, A::CREATE]).fields([
                "id",
                "name",
                "email",
                "phone",
                "source",
                "message",
                "status",
                "createdAt",
            ]),
        )
        // Viewer
        .rule(
            Role::Viewer,
            R::Accounts,
            PermissionRule::new([A::READ]).fields(["legalName", "industry", "website"]),
        )
        .rule(
            Role::Viewer,
            R::Deals,
            PermissionRule::new([A::READ]).fields(["title", "stage"]),
        )
        .rule(
            Role::Viewer,
            R::Tickets,
            PermissionRule::new([A::READ]).fields(["id", "subject", "status", "priority"]),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::EvaluationContext;

    #[test]
    fn test_shared_default_is_one_instance() {
        let a = shared_default_policy();
        let b = shared_default_policy();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(std::ptr::eq(a.as_ref(), default_policy()));
    }

    #[test]
    fn test_default_policy_builds() {
        let table = build_default_policy().unwrap();
        assert_eq!(table.len(), 16);
        assert_eq!(table.version(), DEFAULT_POLICY_VERSION);
        assert_eq!(&table, default_policy());
    }

    #[test]
    fn test_default_policy_is_memoized() {
        assert!(std::ptr::eq(default_policy(), default_policy()));
    }

    #[test]
    fn test_sensitive_fields_hidden_from_agents_and_viewers() {
        let table = default_policy();
        for role in [Role::Agent, Role::Viewer] {
            assert!(!table.can_view_field(role, "accounts", "revenue"));
            assert!(!table.can_view_field(role, "deals", "value"));
            assert!(!table.can_view_field(role, "users", "salary"));
        }
        assert!(table.can_view_field(Role::Manager, "accounts", "revenue"));
        assert!(table.can_view_field(Role::Manager, "deals", "value"));
        assert!(!table.can_view_field(Role::Manager, "users", "salary"));
        assert!(table.can_view_field(Role::Admin, "users", "salary"));
    }

    #[test]
    fn test_agent_accounts_read_only() {
        let table = default_policy();
        assert!(table.has_permission_str("agent", "accounts", "read", None));
        assert!(!table.has_permission_str("agent", "accounts", "delete", None));
        assert!(!table.has_permission_str("agent", "accounts", "update", None));
    }

    #[test]
    fn test_agent_deals_require_assignment() {
        let table = default_policy();
        let mine = EvaluationContext::new().with_user("u1").with_assignee("u1");
        let theirs = EvaluationContext::new().with_user("u1").with_assignee("u2");
        assert!(table.has_permission_str("agent", "deals", "read", Some(&mine)));
        assert!(!table.has_permission_str("agent", "deals", "read", Some(&theirs)));
        assert!(!table.has_permission_str("agent", "deals", "read", None));
    }

    #[test]
    fn test_viewer_cannot_write() {
        let table = default_policy();
        for resource in ["accounts", "deals", "tickets"] {
            assert!(table.has_permission_str("viewer", resource, "read", None));
            for action in ["create", "update", "delete", "export"] {
                assert!(!table.has_permission_str("viewer", resource, action, None));
            }
        }
    }

    #[test]
    fn test_every_known_resource_has_a_manager_rule() {
        let table = default_policy();
        for resource in CrmResource::all() {
            assert!(
                table.rule(Role::Manager, resource.as_str()).is_some(),
                "missing manager rule for {resource}"
            );
        }
    }
}
