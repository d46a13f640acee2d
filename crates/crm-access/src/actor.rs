//! The acting user
//!
//! This module defines who is performing a request, as resolved from the
//! session by the route layer, and how that identity becomes the evaluation
//! context for record-scoped rules.

use crm_rbac::condition::{ASSIGNED_TO, TEAM_ID};
use crm_rbac::{Entity, EvaluationContext, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user on whose behalf a guard or renderer runs.
///
/// The role is kept as the raw session string: a role typo must fail closed
/// when checked, not be coerced into some default role here.
///
/// # Example
///
/// ```
/// use crm_access::Actor;
/// use crm_rbac::Role;
/// use uuid::Uuid;
///
/// let actor = Actor::new(Uuid::now_v7(), "agent").with_team("north");
/// assert_eq!(actor.role(), Some(Role::Agent));
/// assert!(Actor::new(Uuid::now_v7(), "superuser").role().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// User ID
    pub user_id: Uuid,

    /// Role as carried by the session
    pub role: String,

    /// Sales/support team the user belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    /// User email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Actor {
    /// Create an actor.
    pub fn new(user_id: Uuid, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
            team_id: None,
            email: None,
        }
    }

    /// Set the user's team.
    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Set the user's email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Parsed role, or `None` if the session carries an unknown role.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Check if the actor is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|r| r.is_admin())
    }

    /// Context describing the actor alone (`userId`, `userTeamId`).
    pub fn context(&self) -> EvaluationContext {
        let ctx = EvaluationContext::new().with_user(self.user_id.to_string());
        match &self.team_id {
            Some(team) => ctx.with_user_team(team.clone()),
            None => ctx,
        }
    }

    /// Context for acting on `record`: the actor's facts plus the record's
    /// `assignedTo` and `teamId`, when the record has them.
    pub fn context_for(&self, record: &Entity) -> EvaluationContext {
        let mut ctx = self.context();
        for key in [ASSIGNED_TO, TEAM_ID] {
            if let Some(value) = record.get(key) {
                ctx.insert(key, value.clone());
            }
        }
        ctx
    }
}
