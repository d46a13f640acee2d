//! Route guard and field-masking renderer
//!
//! Route handlers call [`AccessGuard::authorize`] before a mutation or a
//! protected view, and [`AccessGuard::render`] before any entity leaves the
//! server. The guard owns nothing mutable: it holds a shared, immutable
//! policy table and can be cloned freely across request handlers.

use std::sync::Arc;

use crm_rbac::{Action, Decision, Entity, EvaluationContext, PolicyTable};
use serde::Serialize;

use crate::actor::Actor;
use crate::audit::AccessDecision;
use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};

/// Guard over a shared policy table.
///
/// # Example
///
/// ```
/// use crm_access::{AccessGuard, Actor};
/// use serde_json::json;
/// use uuid::Uuid;
///
/// let guard = AccessGuard::with_default_policy();
/// let agent = Actor::new(Uuid::now_v7(), "agent");
///
/// assert!(guard.authorize(&agent, "accounts", "read", None).is_ok());
/// assert!(guard.authorize(&agent, "accounts", "delete", None).is_err());
///
/// let account = json!({ "legalName": "Acme", "revenue": 1_000_000 });
/// let shown = guard.render(&agent, "accounts", account.as_object().unwrap());
/// assert!(!shown.contains_key("revenue"));
/// ```
#[derive(Debug, Clone)]
pub struct AccessGuard {
    policy: Arc<PolicyTable>,
    audit: bool,
}

impl AccessGuard {
    /// Create a guard over a policy table, with auditing on.
    pub fn new(policy: Arc<PolicyTable>) -> Self {
        Self {
            policy,
            audit: true,
        }
    }

    /// Create a guard over the built-in CRM policy.
    pub fn with_default_policy() -> Self {
        Self::new(crm_rbac::shared_default_policy())
    }

    /// Create a guard from configuration, loading the policy it names.
    pub fn from_config(config: &AccessConfig) -> AccessResult<Self> {
        Ok(Self::new(config.load_policy()?).with_audit(config.audit_decisions))
    }

    /// Enable or disable decision audit logging.
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit = enabled;
        self
    }

    /// The policy this guard enforces.
    pub fn policy(&self) -> &Arc<PolicyTable> {
        &self.policy
    }

    /// Evaluate a check and return the full decision record.
    ///
    /// When `record` is given, its `assignedTo`/`teamId` feed the rule's
    /// condition; without it, conditional rules deny.
    pub fn decide(
        &self,
        actor: &Actor,
        resource: &str,
        action: &str,
        record: Option<&Entity>,
    ) -> AccessDecision {
        let reason = match actor.role() {
            None => Decision::UnknownRole,
            Some(role) => {
                let context = self.context(actor, record);
                self.policy
                    .explain(role, resource, &Action::new(action), Some(&context))
            }
        };

        let decision = AccessDecision::new(actor, resource, action, reason, self.policy.fingerprint());
        if self.audit {
            decision.log();
        }
        decision
    }

    /// Check whether the actor may perform `action` on `resource`.
    pub fn can(&self, actor: &Actor, resource: &str, action: &str, record: Option<&Entity>) -> bool {
        self.decide(actor, resource, action, record).allowed
    }

    /// Require that the actor may perform `action` on `resource`.
    ///
    /// # Errors
    ///
    /// [`AccessError::UnknownRole`] if the actor's role does not parse,
    /// [`AccessError::Forbidden`] for any other denial.
    pub fn authorize(
        &self,
        actor: &Actor,
        resource: &str,
        action: &str,
        record: Option<&Entity>,
    ) -> AccessResult<()> {
        let decision = self.decide(actor, resource, action, record);
        match decision.reason {
            Decision::AdminOverride | Decision::Granted => Ok(()),
            Decision::UnknownRole => Err(AccessError::UnknownRole(actor.role.clone())),
            _ => Err(AccessError::Forbidden {
                resource: resource.to_string(),
                action: action.to_string(),
            }),
        }
    }

    /// Copy of `entity` holding only the fields the actor may see.
    ///
    /// Unknown roles get an empty object.
    pub fn render(&self, actor: &Actor, resource: &str, entity: &Entity) -> Entity {
        self.policy
            .filter_entity_fields_str(entity, &actor.role, resource)
    }

    /// [`render`](Self::render) for every entity of a list view.
    pub fn render_many(&self, actor: &Actor, resource: &str, entities: &[Entity]) -> Vec<Entity> {
        self.policy
            .filter_entities_str(entities, &actor.role, resource)
    }

    /// [`render`](Self::render) for a typed entity.
    pub fn render_typed<T: Serialize>(
        &self,
        actor: &Actor,
        resource: &str,
        entity: &T,
    ) -> AccessResult<Entity> {
        match actor.role() {
            Some(role) => Ok(self.policy.filter_entity(entity, role, resource)?),
            None => Err(AccessError::UnknownRole(actor.role.clone())),
        }
    }

    /// Detail-view contract: require `read` on the record, then mask it.
    pub fn authorize_and_render(
        &self,
        actor: &Actor,
        resource: &str,
        record: &Entity,
    ) -> AccessResult<Entity> {
        self.authorize(actor, resource, Action::READ, Some(record))?;
        Ok(self.render(actor, resource, record))
    }

    fn context(&self, actor: &Actor, record: Option<&Entity>) -> EvaluationContext {
        match record {
            Some(record) => actor.context_for(record),
            None => actor.context(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn entity(value: Value) -> Entity {
        value.as_object().cloned().unwrap()
    }

    fn guard() -> AccessGuard {
        AccessGuard::with_default_policy().with_audit(false)
    }

    #[test]
    fn test_admin_passes_everything() {
        let admin = Actor::new(Uuid::now_v7(), "admin");
        let g = guard();
        assert!(g.authorize(&admin, "users", "delete", None).is_ok());
        assert!(g.authorize(&admin, "services", "publish", None).is_ok());

        let user = entity(json!({ "name": "Sara", "salary": 9000 }));
        assert_eq!(g.render(&admin, "users", &user), user);
    }

    #[test]
    fn test_default_guards_share_one_table() {
        let a = guard();
        let b = AccessGuard::from_config(&AccessConfig::new()).unwrap();
        assert!(Arc::ptr_eq(a.policy(), b.policy()));
        assert!(Arc::ptr_eq(a.policy(), &crm_rbac::shared_default_policy()));
    }

    #[test]
    fn test_near_miss_admin_is_unknown() {
        let g = guard();
        for raw in ["ADMIN", " admin", " Admin\n"] {
            let actor = Actor::new(Uuid::now_v7(), raw);
            let err = g.authorize(&actor, "users", "delete", None).unwrap_err();
            assert!(matches!(err, AccessError::UnknownRole(_)), "{raw:?}");
            let user = entity(json!({ "name": "Sara", "salary": 9000 }));
            assert!(g.render(&actor, "users", &user).is_empty());
        }
    }

    #[test]
    fn test_forbidden_action() {
        let agent = Actor::new(Uuid::now_v7(), "agent");
        let err = guard().authorize(&agent, "accounts", "delete", None).unwrap_err();
        assert!(matches!(err, AccessError::Forbidden { .. }));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_unknown_role() {
        let typo = Actor::new(Uuid::now_v7(), "admn");
        let g = guard();
        let err = g.authorize(&typo, "accounts", "read", None).unwrap_err();
        assert!(matches!(err, AccessError::UnknownRole(ref r) if r == "admn"));
        assert!(!g.can(&typo, "accounts", "read", None));

        let account = entity(json!({ "legalName": "Acme" }));
        assert!(g.render(&typo, "accounts", &account).is_empty());
        assert!(g.render_many(&typo, "accounts", &[account.clone()])[0].is_empty());
        assert!(g.render_typed(&typo, "accounts", &account).is_err());
    }

    #[test]
    fn test_record_scoped_authorization() {
        let id = Uuid::now_v7();
        let agent = Actor::new(id, "agent");
        let g = guard();

        let mine = entity(json!({ "title": "Renewal", "assignedTo": id.to_string(), "value": 5000 }));
        let theirs = entity(json!({ "title": "Upsell", "assignedTo": "someone-else" }));

        assert!(g.authorize(&agent, "deals", "update", Some(&mine)).is_ok());
        assert!(g.authorize(&agent, "deals", "update", Some(&theirs)).is_err());
        // Conditional rule without a record fails closed.
        assert!(g.authorize(&agent, "deals", "read", None).is_err());
    }

    #[test]
    fn test_blank_ids_never_satisfy_conditions() {
        let g = guard();
        let manager = Actor::new(Uuid::now_v7(), "manager").with_team("");
        let deal = entity(json!({ "title": "Renewal", "teamId": "" }));
        assert!(g.authorize(&manager, "deals", "update", Some(&deal)).is_err());

        let manager = manager.with_team("north");
        let deal = entity(json!({ "title": "Renewal", "teamId": "north" }));
        assert!(g.authorize(&manager, "deals", "update", Some(&deal)).is_ok());

        let agent = Actor::new(Uuid::now_v7(), "agent");
        for assigned in [json!(""), json!(true), json!({})] {
            let deal = entity(json!({ "title": "Renewal", "assignedTo": assigned }));
            assert!(g.authorize(&agent, "deals", "read", Some(&deal)).is_err());
        }
    }

    #[test]
    fn test_authorize_and_render() {
        let id = Uuid::now_v7();
        let agent = Actor::new(id, "agent");
        let deal = entity(json!({
            "id": "d1",
            "title": "Renewal",
            "value": 5000,
            "stage": "proposal",
            "assignedTo": id.to_string(),
        }));

        let shown = guard().authorize_and_render(&agent, "deals", &deal).unwrap();
        assert_eq!(
            Value::Object(shown),
            json!({ "id": "d1", "title": "Renewal", "stage": "proposal", "assignedTo": id.to_string() })
        );
    }

    #[test]
    fn test_decision_carries_fingerprint() {
        let g = guard();
        let viewer = Actor::new(Uuid::now_v7(), "viewer");
        let d = g.decide(&viewer, "tickets", "update", None);
        assert!(!d.allowed);
        assert_eq!(d.reason, Decision::ActionNotPermitted);
        assert_eq!(d.policy_fingerprint, g.policy().fingerprint());
    }
}
