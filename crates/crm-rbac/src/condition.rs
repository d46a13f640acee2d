//! # Conditions
//!
//! Record-scoped predicates a rule can require on top of the action grant.
//! Conditions are a closed set of variants evaluated against an
//! [`EvaluationContext`], so a policy table stays plain data.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context key: id of the acting user.
pub const USER_ID: &str = "userId";
/// Context key: id of the user the record is assigned to.
pub const ASSIGNED_TO: &str = "assignedTo";
/// Context key: team the record belongs to.
pub const TEAM_ID: &str = "teamId";
/// Context key: team of the acting user.
pub const USER_TEAM_ID: &str = "userTeamId";

/// A declarative record-level predicate.
///
/// # Example
///
/// ```
/// use crm_rbac::{Condition, EvaluationContext};
///
/// let ctx = EvaluationContext::new().with_user("u1").with_assignee("u1");
/// assert!(Condition::AssignedToSelf.evaluate(Some(&ctx)));
/// assert!(!Condition::AssignedToSelf.evaluate(None));
/// assert!(Condition::None.evaluate(None));
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// No record-level restriction.
    #[default]
    None,

    /// `assignedTo` must equal `userId`.
    AssignedToSelf,

    /// `teamId` must equal `userTeamId`.
    SameTeam,
}

impl Condition {
    /// Check if this condition restricts anything.
    pub fn is_none(&self) -> bool {
        matches!(self, Condition::None)
    }

    /// Evaluate the predicate.
    ///
    /// A missing context, a missing key or a `null` value on either side of
    /// the comparison means the condition is not satisfied.
    pub fn evaluate(&self, context: Option<&EvaluationContext>) -> bool {
        let (left, right) = match self {
            Condition::None => return true,
            Condition::AssignedToSelf => (ASSIGNED_TO, USER_ID),
            Condition::SameTeam => (TEAM_ID, USER_TEAM_ID),
        };

        let Some(ctx) = context else {
            return false;
        };

        match (ctx.get(left), ctx.get(right)) {
            (Some(a), Some(b)) => same_identity(a, b),
            _ => false,
        }
    }
}

/// Compare two identity values.
///
/// Ids reach the context as either JSON strings or numbers depending on the
/// store, so `7` and `"7"` are the same identity. Anything else (null, blank
/// strings, booleans, arrays, objects) is not an identity and never matches.
fn same_identity(a: &Value, b: &Value) -> bool {
    match (identity(a), identity(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn identity(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Record-specific facts supplied at call time.
///
/// The context is an opaque key/value bag; the well-known keys are
/// [`USER_ID`], [`ASSIGNED_TO`], [`TEAM_ID`] and [`USER_TEAM_ID`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct EvaluationContext {
    values: Map<String, Value>,
}

impl EvaluationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the acting user's id.
    pub fn with_user(self, user_id: impl Into<Value>) -> Self {
        self.with(USER_ID, user_id)
    }

    /// Set the record's assignee.
    pub fn with_assignee(self, assigned_to: impl Into<Value>) -> Self {
        self.with(ASSIGNED_TO, assigned_to)
    }

    /// Set the record's team.
    pub fn with_team(self, team_id: impl Into<Value>) -> Self {
        self.with(TEAM_ID, team_id)
    }

    /// Set the acting user's team.
    pub fn with_user_team(self, team_id: impl Into<Value>) -> Self {
        self.with(USER_TEAM_ID, team_id)
    }

    /// Set an arbitrary key, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set an arbitrary key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Check if the context carries no facts.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for EvaluationContext {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assigned_to_self() {
        let mine = EvaluationContext::new().with_user("u1").with_assignee("u1");
        let theirs = EvaluationContext::new().with_user("u1").with_assignee("u2");
        assert!(Condition::AssignedToSelf.evaluate(Some(&mine)));
        assert!(!Condition::AssignedToSelf.evaluate(Some(&theirs)));
    }

    #[test]
    fn test_same_team() {
        let same = EvaluationContext::new().with_team("t1").with_user_team("t1");
        let other = EvaluationContext::new().with_team("t1").with_user_team("t2");
        assert!(Condition::SameTeam.evaluate(Some(&same)));
        assert!(!Condition::SameTeam.evaluate(Some(&other)));
    }

    #[test]
    fn test_missing_context_fails_closed() {
        assert!(!Condition::AssignedToSelf.evaluate(None));
        assert!(!Condition::SameTeam.evaluate(None));
        assert!(!Condition::AssignedToSelf.evaluate(Some(&EvaluationContext::new())));
    }

    #[test]
    fn test_missing_key_fails_closed() {
        let only_user = EvaluationContext::new().with_user("u1");
        assert!(!Condition::AssignedToSelf.evaluate(Some(&only_user)));

        let only_team = EvaluationContext::new().with_team("t1");
        assert!(!Condition::SameTeam.evaluate(Some(&only_team)));
    }

    #[test]
    fn test_nulls_never_match() {
        let ctx = EvaluationContext::new()
            .with_user(Value::Null)
            .with_assignee(Value::Null);
        assert!(!Condition::AssignedToSelf.evaluate(Some(&ctx)));
    }

    #[test]
    fn test_blank_and_non_scalar_ids_never_match() {
        let malformed = [
            json!(""),
            json!("  "),
            json!(true),
            json!(false),
            json!({}),
            json!({ "id": 1 }),
            json!([]),
            json!(["u1"]),
        ];
        for value in malformed {
            let ctx = EvaluationContext::new()
                .with_user(value.clone())
                .with_assignee(value.clone());
            assert!(!Condition::AssignedToSelf.evaluate(Some(&ctx)), "{value}");

            let ctx = EvaluationContext::new()
                .with_team(value.clone())
                .with_user_team(value.clone());
            assert!(!Condition::SameTeam.evaluate(Some(&ctx)), "{value}");
        }
    }

    #[test]
    fn test_numeric_and_string_ids_compare_equal() {
        let ctx = EvaluationContext::new().with_user(42).with_assignee("42");
        assert!(Condition::AssignedToSelf.evaluate(Some(&ctx)));

        let ctx = EvaluationContext::new().with_user(42).with_assignee(43);
        assert!(!Condition::AssignedToSelf.evaluate(Some(&ctx)));
    }

    #[test]
    fn test_no_condition_ignores_context() {
        assert!(Condition::None.evaluate(None));
        assert!(Condition::None.evaluate(Some(&EvaluationContext::new())));
    }

    #[test]
    fn test_context_from_json_object() {
        let value = json!({ "userId": "u9", "assignedTo": "u9", "extra": true });
        let Value::Object(map) = value else {
            unreachable!()
        };
        let ctx = EvaluationContext::from(map);
        assert!(Condition::AssignedToSelf.evaluate(Some(&ctx)));
        assert_eq!(ctx.get("extra"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_condition_serde() {
        assert_eq!(
            serde_json::to_string(&Condition::AssignedToSelf).unwrap(),
            "\"assigned_to_self\""
        );
        let c: Condition = serde_json::from_str("\"same_team\"").unwrap();
        assert_eq!(c, Condition::SameTeam);
    }
}
