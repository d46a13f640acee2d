//! # CRM RBAC (Role-Based Access Control)
//!
//! This crate provides role-based, field-level access control for the CRM
//! back office behind the marketing site (accounts, contacts, deals,
//! tickets, client requests, leads, users).
//!
//! ## Overview
//!
//! The crm-rbac crate handles:
//! - **Roles**: `admin`, `manager`, `agent`, `viewer` (flat, no inheritance)
//! - **Policy table**: role → resource → {actions, fields, condition}
//! - **Evaluator**: may a role perform an action on a resource?
//! - **Field visibility**: which entity fields a role may see
//! - **Entity filter**: strip hidden fields before rendering/serializing
//!
//! ## Architecture
//!
//! ```text
//! PolicyTable (built once, immutable)
//!   └─ Role ─→ Resource ─→ PermissionRule
//!                             ├─ actions    ["read", "update"] | ["*"]
//!                             ├─ fields     ["title", "stage"] | ["*"]
//!                             └─ condition  none | assigned_to_self | same_team
//!
//! has_permission(role, resource, action, ctx?)  ─→ bool
//! get_visible_fields(role, resource)            ─→ ["title", ...] | ["*"]
//! filter_entity_fields(entity, role, resource)  ─→ entity with visible keys only
//! ```
//!
//! `admin` bypasses the table entirely. Everything else fails closed: unknown
//! roles, undeclared resources, ungranted actions and unsatisfied conditions
//! all deny, and an undeclared resource exposes no fields.
//!
//! ## Usage
//!
//! ```rust
//! use crm_rbac::{EvaluationContext, has_permission, filter_entity_fields};
//! use serde_json::json;
//!
//! // Agents may read deals assigned to them.
//! let ctx = EvaluationContext::new().with_user("u1").with_assignee("u1");
//! assert!(has_permission("agent", "deals", "read", Some(&ctx)));
//! assert!(!has_permission("agent", "deals", "delete", Some(&ctx)));
//!
//! // Revenue is masked for agents.
//! let account = json!({ "legalName": "Acme", "revenue": 1_000_000 });
//! let visible = filter_entity_fields(account.as_object().unwrap(), "agent", "accounts");
//! assert!(!visible.contains_key("revenue"));
//! ```

pub mod actions;
pub mod condition;
pub mod defaults;
pub mod error;
pub mod evaluator;
pub mod fields;
pub mod policy;
pub mod resources;
pub mod roles;

// Re-export main types for convenience
pub use actions::Action;
pub use condition::{Condition, EvaluationContext};
pub use defaults::{build_default_policy, default_policy, shared_default_policy};
pub use error::{PolicyError, PolicyResult};
pub use evaluator::Decision;
pub use fields::{Entity, VisibleFields};
pub use policy::{FieldList, PermissionRule, PolicyDocument, PolicyTable, RuleEntry};
pub use resources::{CrmResource, Resource};
pub use roles::Role;

/// Check a permission against the built-in policy.
///
/// See [`PolicyTable::has_permission`]. Unknown roles are denied.
pub fn has_permission(
    role: &str,
    resource: &str,
    action: &str,
    context: Option<&EvaluationContext>,
) -> bool {
    default_policy().has_permission_str(role, resource, action, context)
}

/// Visible fields under the built-in policy; `["*"]` means unrestricted.
pub fn get_visible_fields(role: &str, resource: &str) -> Vec<String> {
    default_policy().get_visible_fields_str(role, resource)
}

/// Check field visibility under the built-in policy.
pub fn can_view_field(role: &str, resource: &str, field: &str) -> bool {
    default_policy().can_view_field_str(role, resource, field)
}

/// Filter an entity under the built-in policy.
pub fn filter_entity_fields(entity: &Entity, role: &str, resource: &str) -> Entity {
    default_policy().filter_entity_fields_str(entity, role, resource)
}
