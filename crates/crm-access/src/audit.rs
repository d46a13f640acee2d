//! Access decision records.

use chrono::{DateTime, Utc};
use crm_rbac::Decision;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Actor;

/// One evaluated access check, suitable for an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    /// When the check ran
    pub decided_at: DateTime<Utc>,

    /// Acting user
    pub user_id: Uuid,

    /// Role string as carried by the session
    pub role: String,

    /// Resource name
    pub resource: String,

    /// Action name
    pub action: String,

    /// Outcome
    pub allowed: bool,

    /// Why
    pub reason: Decision,

    /// Fingerprint of the policy table that decided
    pub policy_fingerprint: String,
}

impl AccessDecision {
    pub(crate) fn new(
        actor: &Actor,
        resource: &str,
        action: &str,
        reason: Decision,
        policy_fingerprint: &str,
    ) -> Self {
        Self {
            decided_at: Utc::now(),
            user_id: actor.user_id,
            role: actor.role.clone(),
            resource: resource.to_string(),
            action: action.to_string(),
            allowed: reason.is_allowed(),
            reason,
            policy_fingerprint: policy_fingerprint.to_string(),
        }
    }

    /// Emit the decision through `tracing`: denials at info, grants at debug.
    pub fn log(&self) {
        if self.allowed {
            tracing::debug!(
                user_id = %self.user_id,
                role = %self.role,
                resource = %self.resource,
                action = %self.action,
                reason = self.reason.as_str(),
                "Access granted"
            );
        } else {
            tracing::info!(
                user_id = %self.user_id,
                role = %self.role,
                resource = %self.resource,
                action = %self.action,
                reason = self.reason.as_str(),
                policy = %self.policy_fingerprint,
                "Access denied"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_record() {
        let actor = Actor::new(Uuid::now_v7(), "viewer");
        let record = AccessDecision::new(&actor, "deals", "delete", Decision::ActionNotPermitted, "fp");
        assert!(!record.allowed);
        assert_eq!(record.user_id, actor.user_id);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["reason"], "action_not_permitted");
        assert_eq!(json["policyFingerprint"], "fp");
        assert_eq!(json["allowed"], false);
    }
}
