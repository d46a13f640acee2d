//! # Permission Evaluator
//!
//! Answers "may this role perform this action on this resource?" against a
//! [`PolicyTable`]. Evaluation is pure and fails closed: an unknown role, a
//! missing rule, an ungranted action or an unsatisfied condition all deny.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::condition::EvaluationContext;
use crate::policy::PolicyTable;
use crate::roles::Role;

/// Why an evaluation came out the way it did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Role is admin; the table was not consulted.
    AdminOverride,
    /// Rule exists, action granted, condition (if any) satisfied.
    Granted,
    /// Role string did not parse.
    UnknownRole,
    /// No rule for (role, resource).
    NoRule,
    /// Rule exists but does not grant the action.
    ActionNotPermitted,
    /// Action granted but the rule's condition did not hold.
    ConditionUnsatisfied,
}

impl Decision {
    /// Check if the decision allows the action.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::AdminOverride | Decision::Granted)
    }

    /// Get the string representation of the decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::AdminOverride => "admin_override",
            Decision::Granted => "granted",
            Decision::UnknownRole => "unknown_role",
            Decision::NoRule => "no_rule",
            Decision::ActionNotPermitted => "action_not_permitted",
            Decision::ConditionUnsatisfied => "condition_unsatisfied",
        }
    }
}

impl PolicyTable {
    /// Evaluate a permission and report the reason.
    ///
    /// # Example
    ///
    /// ```
    /// use crm_rbac::{Action, Condition, Decision, EvaluationContext, PermissionRule, PolicyTable, Role};
    ///
    /// let table = PolicyTable::builder()
    ///     .rule(
    ///         Role::Agent,
    ///         "deals",
    ///         PermissionRule::new([Action::READ]).when(Condition::AssignedToSelf),
    ///     )
    ///     .build()
    ///     .unwrap();
    ///
    /// let read = Action::new("read");
    /// let theirs = EvaluationContext::new().with_user("u1").with_assignee("u2");
    /// assert_eq!(
    ///     table.explain(Role::Agent, "deals", &read, Some(&theirs)),
    ///     Decision::ConditionUnsatisfied
    /// );
    /// assert_eq!(table.explain(Role::Admin, "anything", &read, None), Decision::AdminOverride);
    /// ```
    pub fn explain(
        &self,
        role: Role,
        resource: &str,
        action: &Action,
        context: Option<&EvaluationContext>,
    ) -> Decision {
        if role.is_admin() {
            return Decision::AdminOverride;
        }

        let decision = match self.rule(role, resource) {
            None => Decision::NoRule,
            Some(rule) if !rule.permits(action) => Decision::ActionNotPermitted,
            Some(rule) if !rule.condition.evaluate(context) => Decision::ConditionUnsatisfied,
            Some(_) => Decision::Granted,
        };

        if !decision.is_allowed() {
            tracing::trace!(
                role = %role,
                resource = resource,
                action = %action,
                reason = decision.as_str(),
                "Permission denied"
            );
        }
        decision
    }

    /// Same as [`explain`](Self::explain), for a raw role string.
    ///
    /// A role string that does not parse yields [`Decision::UnknownRole`].
    pub fn explain_str(
        &self,
        role: &str,
        resource: &str,
        action: &str,
        context: Option<&EvaluationContext>,
    ) -> Decision {
        match Role::parse(role) {
            Some(role) => self.explain(role, resource, &Action::new(action), context),
            None => {
                tracing::debug!(role = role, resource = resource, action = action, "Unknown role denied");
                Decision::UnknownRole
            }
        }
    }

    /// Check whether `role` may perform `action` on `resource`.
    ///
    /// Admin is always allowed. Otherwise the (role, resource) rule must
    /// exist, grant the action literally or via `"*"`, and have its condition
    /// satisfied by `context`; a missing context fails any condition.
    pub fn has_permission(
        &self,
        role: Role,
        resource: &str,
        action: &Action,
        context: Option<&EvaluationContext>,
    ) -> bool {
        self.explain(role, resource, action, context).is_allowed()
    }

    /// Same as [`has_permission`](Self::has_permission), for a raw role string.
    ///
    /// Unrecognized roles are denied, never an error.
    pub fn has_permission_str(
        &self,
        role: &str,
        resource: &str,
        action: &str,
        context: Option<&EvaluationContext>,
    ) -> bool {
        self.explain_str(role, resource, action, context).is_allowed()
    }
}
