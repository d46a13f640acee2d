//! # Policy Table
//!
//! The declarative role → resource → rule mapping. A table is built once,
//! validated up front, and never mutated afterwards; evaluation lives in
//! [`crate::evaluator`] and field resolution in [`crate::fields`].

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::actions::Action;
use crate::condition::Condition;
use crate::error::{PolicyError, PolicyResult};
use crate::resources::Resource;
use crate::roles::Role;

/// Field-list marker meaning "all fields visible".
pub const ALL_FIELDS: &str = "*";

/// The fields a rule exposes.
///
/// Serialized as a plain JSON array; the single-element array `["*"]` is
/// [`FieldList::All`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum FieldList {
    /// Every field of the entity.
    All,
    /// Only these fields, in declaration order.
    Only(Vec<String>),
}

impl Default for FieldList {
    fn default() -> Self {
        FieldList::Only(Vec::new())
    }
}

impl From<Vec<String>> for FieldList {
    fn from(fields: Vec<String>) -> Self {
        if fields.len() == 1 && fields[0] == ALL_FIELDS {
            FieldList::All
        } else {
            FieldList::Only(fields)
        }
    }
}

impl From<FieldList> for Vec<String> {
    fn from(fields: FieldList) -> Self {
        match fields {
            FieldList::All => vec![ALL_FIELDS.to_string()],
            FieldList::Only(names) => names,
        }
    }
}

/// What a role may do with one resource.
///
/// # Example
///
/// ```
/// use crm_rbac::{Action, Condition, PermissionRule};
///
/// let rule = PermissionRule::new([Action::READ, Action::UPDATE])
///     .fields(["id", "title", "stage"])
///     .when(Condition::AssignedToSelf);
///
/// assert!(rule.permits(&Action::new("read")));
/// assert!(!rule.permits(&Action::new("delete")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Granted actions; may contain [`Action::ANY`].
    pub actions: Vec<Action>,

    /// Visible fields.
    #[serde(default)]
    pub fields: FieldList,

    /// Record-level predicate required in addition to the action grant.
    #[serde(default, skip_serializing_if = "Condition::is_none")]
    pub condition: Condition,
}

impl PermissionRule {
    /// Create a rule granting the given actions, with no visible fields and no condition.
    pub fn new<I, A>(actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            fields: FieldList::default(),
            condition: Condition::None,
        }
    }

    /// Set the visible fields. `["*"]` means all fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = FieldList::from(fields.into_iter().map(Into::into).collect::<Vec<String>>());
        self
    }

    /// Make every field visible.
    pub fn all_fields(mut self) -> Self {
        self.fields = FieldList::All;
        self
    }

    /// Require a record-level condition.
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Check if the rule grants the requested action (literally or via wildcard).
    pub fn permits(&self, requested: &Action) -> bool {
        self.actions.iter().any(|granted| granted.permits(requested))
    }

    fn validate(&self, role: Role, resource: &Resource) -> PolicyResult<()> {
        let role_name = || role.as_str().to_string();
        let resource_name = || resource.as_str().to_string();

        if self.actions.is_empty() {
            return Err(PolicyError::NoActions {
                role: role_name(),
                resource: resource_name(),
            });
        }
        if self.actions.iter().any(|a| a.as_str().trim().is_empty()) {
            return Err(PolicyError::EmptyAction {
                role: role_name(),
                resource: resource_name(),
            });
        }

        if let FieldList::Only(names) = &self.fields {
            let invalid = |message: String| PolicyError::InvalidFields {
                role: role_name(),
                resource: resource_name(),
                message,
            };
            let mut seen = HashSet::new();
            for name in names {
                if name.trim().is_empty() {
                    return Err(invalid("empty field name".to_string()));
                }
                if name == ALL_FIELDS {
                    return Err(invalid("'*' must be the only entry".to_string()));
                }
                if !seen.insert(name.as_str()) {
                    return Err(invalid(format!("field '{}' listed twice", name)));
                }
            }
        }

        Ok(())
    }
}

/// Serializable form of a policy table.
///
/// ```json
/// {
///   "version": 3,
///   "always_visible": ["id"],
///   "rules": [
///     { "role": "agent", "resource": "deals", "actions": ["read"],
///       "fields": ["title", "stage"], "condition": "assigned_to_self" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Policy version, bumped whenever the rules change.
    #[serde(default = "default_version")]
    pub version: u32,

    /// System fields visible wherever a rule exists.
    #[serde(default)]
    pub always_visible: Vec<String>,

    /// One entry per (role, resource).
    pub rules: Vec<RuleEntry>,
}

fn default_version() -> u32 {
    1
}

/// A single (role, resource) entry of a [`PolicyDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Role name; must parse as a [`Role`].
    pub role: String,

    /// Resource name.
    pub resource: Resource,

    /// The rule itself.
    #[serde(flatten)]
    pub rule: PermissionRule,
}

/// Immutable role → resource → rule table.
///
/// Admin never appears in the table: it is handled by the evaluator as a
/// universal override. A missing (role, resource) entry means no actions and
/// no visible fields.
///
/// # Example
///
/// ```
/// use crm_rbac::{Action, PermissionRule, PolicyTable, Role};
///
/// let table = PolicyTable::builder()
///     .rule(Role::Agent, "accounts", PermissionRule::new([Action::READ]).fields(["legalName"]))
///     .build()
///     .unwrap();
///
/// assert!(table.rule(Role::Agent, "accounts").is_some());
/// assert!(table.rule(Role::Viewer, "accounts").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    version: u32,
    always_visible: Vec<String>,
    rules: BTreeMap<Role, BTreeMap<Resource, PermissionRule>>,
    fingerprint: String,
}

impl PolicyTable {
    /// Start building a table.
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::default()
    }

    /// Build a table from its serializable form.
    ///
    /// Unknown role names are rejected rather than skipped.
    pub fn from_document(document: PolicyDocument) -> PolicyResult<Self> {
        let mut builder = Self::builder()
            .version(document.version)
            .always_visible(document.always_visible);
        for entry in document.rules {
            let role = Role::parse_lenient(&entry.role).ok_or(PolicyError::UnknownRole(entry.role))?;
            builder = builder.rule(role, entry.resource, entry.rule);
        }
        builder.build()
    }

    /// Parse and build a table from a JSON policy document.
    pub fn from_json_str(json: &str) -> PolicyResult<Self> {
        let document: PolicyDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Read, parse and build a table from a JSON policy file.
    pub fn from_path(path: impl AsRef<Path>) -> PolicyResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            version = table.version,
            fingerprint = %table.fingerprint,
            "Loaded policy document"
        );
        Ok(table)
    }

    /// Render the table back to its serializable form (roles, then resources, in sorted order).
    pub fn to_document(&self) -> PolicyDocument {
        let rules = self
            .rules
            .iter()
            .flat_map(|(role, by_resource)| {
                by_resource.iter().map(move |(resource, rule)| RuleEntry {
                    role: role.as_str().to_string(),
                    resource: resource.clone(),
                    rule: rule.clone(),
                })
            })
            .collect();

        PolicyDocument {
            version: self.version,
            always_visible: self.always_visible.clone(),
            rules,
        }
    }

    /// Policy version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// SHA-256 of the canonical document, URL-safe base64 without padding.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// System fields visible wherever a rule exists.
    pub fn always_visible(&self) -> &[String] {
        &self.always_visible
    }

    /// Look up the rule for a (role, resource) pair.
    pub fn rule(&self, role: Role, resource: &str) -> Option<&PermissionRule> {
        self.rules.get(&role)?.get(resource)
    }

    /// All rules declared for a role.
    pub fn rules_for(&self, role: Role) -> impl Iterator<Item = (&Resource, &PermissionRule)> {
        self.rules.get(&role).into_iter().flat_map(|m| m.iter())
    }

    /// Number of declared (role, resource) rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(BTreeMap::len).sum()
    }

    /// Check if no rules are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for [`PolicyTable`]; all validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct PolicyTableBuilder {
    version: u32,
    always_visible: Vec<String>,
    entries: Vec<(Role, Resource, PermissionRule)>,
}

impl Default for PolicyTableBuilder {
    fn default() -> Self {
        Self {
            version: default_version(),
            always_visible: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl PolicyTableBuilder {
    /// Set the policy version.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Declare system fields visible wherever a rule exists (e.g. `id`).
    pub fn always_visible<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.always_visible = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the rule for a (role, resource) pair.
    pub fn rule(mut self, role: Role, resource: impl Into<Resource>, rule: PermissionRule) -> Self {
        self.entries.push((role, resource.into(), rule));
        self
    }

    /// Validate and freeze the table.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate (role, resource), a rule for admin, an empty
    /// resource/action/field name, a rule with no actions, or `"*"` mixed
    /// with named fields.
    pub fn build(self) -> PolicyResult<PolicyTable> {
        for name in &self.always_visible {
            if name.trim().is_empty() || name == ALL_FIELDS {
                return Err(PolicyError::InvalidAlwaysVisible(name.clone()));
            }
        }

        let mut rules: BTreeMap<Role, BTreeMap<Resource, PermissionRule>> = BTreeMap::new();
        for (role, resource, rule) in self.entries {
            if role.is_admin() {
                return Err(PolicyError::AdminRule(resource.as_str().to_string()));
            }
            if resource.as_str().trim().is_empty() {
                return Err(PolicyError::EmptyResource(role.as_str().to_string()));
            }
            rule.validate(role, &resource)?;

            let by_resource = rules.entry(role).or_default();
            if by_resource.contains_key(&resource) {
                return Err(PolicyError::DuplicateRule {
                    role: role.as_str().to_string(),
                    resource: resource.as_str().to_string(),
                });
            }
            by_resource.insert(resource, rule);
        }

        let mut table = PolicyTable {
            version: self.version,
            always_visible: self.always_visible,
            rules,
            fingerprint: String::new(),
        };
        let canonical = serde_json::to_vec(&table.to_document())?;
        table.fingerprint =
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(&canonical));

        tracing::debug!(
            version = table.version,
            rules = table.len(),
            fingerprint = %table.fingerprint,
            "Built policy table"
        );
        Ok(table)
    }
}
