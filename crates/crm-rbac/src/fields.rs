//! # Field Visibility
//!
//! Resolves which entity fields a role may see for a resource and strips
//! everything else from an entity before it is rendered or serialized.
//! [`PolicyTable::can_view_field`] and the filters are built on
//! [`PolicyTable::visible_fields`] and never decide anything on their own.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{PolicyError, PolicyResult};
use crate::policy::{FieldList, PolicyTable, ALL_FIELDS};
use crate::roles::Role;

/// A JSON entity as stored/rendered: field name → value.
pub type Entity = Map<String, Value>;

/// The resolved set of visible fields for a (role, resource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleFields {
    /// Unrestricted.
    All,
    /// Only these fields, in declaration order. Empty means nothing is visible.
    Listed(Vec<String>),
}

impl VisibleFields {
    /// Check if every field is visible.
    pub fn is_all(&self) -> bool {
        matches!(self, VisibleFields::All)
    }

    /// Check if a field is visible.
    pub fn contains(&self, field: &str) -> bool {
        match self {
            VisibleFields::All => true,
            VisibleFields::Listed(names) => names.iter().any(|n| n == field),
        }
    }

    /// Field names, with `["*"]` standing for unrestricted.
    pub fn names(&self) -> Vec<String> {
        match self {
            VisibleFields::All => vec![ALL_FIELDS.to_string()],
            VisibleFields::Listed(names) => names.clone(),
        }
    }

    /// Keep only the visible keys of `entity`, in the entity's own key order.
    ///
    /// Keys that are visible but absent from the entity stay absent.
    pub fn apply(&self, entity: &Entity) -> Entity {
        match self {
            VisibleFields::All => entity.clone(),
            VisibleFields::Listed(_) => entity
                .iter()
                .filter(|(key, _)| self.contains(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

impl PolicyTable {
    /// Resolve the fields `role` may see on `resource`.
    ///
    /// - Admin: [`VisibleFields::All`], for every resource.
    /// - Declared rule: its fields in declaration order, followed by the
    ///   table's always-visible fields not already listed.
    /// - No rule: an empty list.
    ///
    /// # Example
    ///
    /// ```
    /// use crm_rbac::{PermissionRule, PolicyTable, Role, VisibleFields};
    ///
    /// let table = PolicyTable::builder()
    ///     .rule(Role::Viewer, "deals", PermissionRule::new(["read"]).fields(["title", "stage"]))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(table.visible_fields(Role::Admin, "deals"), VisibleFields::All);
    /// assert_eq!(table.get_visible_fields(Role::Viewer, "deals"), vec!["title", "stage"]);
    /// assert!(table.get_visible_fields(Role::Viewer, "users").is_empty());
    /// ```
    pub fn visible_fields(&self, role: Role, resource: &str) -> VisibleFields {
        if role.is_admin() {
            return VisibleFields::All;
        }

        match self.rule(role, resource).map(|rule| &rule.fields) {
            None => VisibleFields::Listed(Vec::new()),
            Some(FieldList::All) => VisibleFields::All,
            Some(FieldList::Only(declared)) => {
                let mut names = declared.clone();
                for system in self.always_visible() {
                    if !names.contains(system) {
                        names.push(system.clone());
                    }
                }
                VisibleFields::Listed(names)
            }
        }
    }

    /// Visible field names for `role` on `resource`; `["*"]` means unrestricted.
    pub fn get_visible_fields(&self, role: Role, resource: &str) -> Vec<String> {
        self.visible_fields(role, resource).names()
    }

    /// Same as [`get_visible_fields`](Self::get_visible_fields), for a raw role
    /// string. Unknown roles see nothing.
    pub fn get_visible_fields_str(&self, role: &str, resource: &str) -> Vec<String> {
        self.visible_fields_str(role, resource).names()
    }

    /// Check if `role` may see `field` on `resource`.
    pub fn can_view_field(&self, role: Role, resource: &str, field: &str) -> bool {
        self.visible_fields(role, resource).contains(field)
    }

    /// Same as [`can_view_field`](Self::can_view_field), for a raw role string.
    pub fn can_view_field_str(&self, role: &str, resource: &str, field: &str) -> bool {
        self.visible_fields_str(role, resource).contains(field)
    }

    /// Return a copy of `entity` holding only the fields `role` may see.
    ///
    /// The input is never modified. Filtering an already filtered entity with
    /// the same role and resource returns it unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use crm_rbac::{PermissionRule, PolicyTable, Role};
    /// use serde_json::json;
    ///
    /// let table = PolicyTable::builder()
    ///     .rule(Role::Agent, "accounts", PermissionRule::new(["read"]).fields(["legalName", "email"]))
    ///     .build()
    ///     .unwrap();
    ///
    /// let entity = json!({ "id": "1", "legalName": "X", "revenue": 1000000, "email": "a@b.com" });
    /// let filtered = table.filter_entity_fields(entity.as_object().unwrap(), Role::Agent, "accounts");
    /// assert_eq!(serde_json::Value::Object(filtered), json!({ "legalName": "X", "email": "a@b.com" }));
    /// ```
    pub fn filter_entity_fields(&self, entity: &Entity, role: Role, resource: &str) -> Entity {
        mask(&self.visible_fields(role, resource), entity, role.as_str(), resource)
    }

    /// Same as [`filter_entity_fields`](Self::filter_entity_fields), for a raw
    /// role string. Unknown roles get an empty object.
    pub fn filter_entity_fields_str(&self, entity: &Entity, role: &str, resource: &str) -> Entity {
        mask(&self.visible_fields_str(role, resource), entity, role, resource)
    }

    /// Filter every entity of a list.
    pub fn filter_entities(&self, entities: &[Entity], role: Role, resource: &str) -> Vec<Entity> {
        let visible = self.visible_fields(role, resource);
        entities
            .iter()
            .map(|e| mask(&visible, e, role.as_str(), resource))
            .collect()
    }

    /// Same as [`filter_entities`](Self::filter_entities), for a raw role
    /// string. Unknown roles get one empty object per entity.
    pub fn filter_entities_str(
        &self,
        entities: &[Entity],
        role: &str,
        resource: &str,
    ) -> Vec<Entity> {
        let visible = self.visible_fields_str(role, resource);
        entities
            .iter()
            .map(|e| mask(&visible, e, role, resource))
            .collect()
    }

    /// Serialize a typed entity and filter its fields.
    ///
    /// # Errors
    ///
    /// [`PolicyError::NotAnObject`] if `entity` does not serialize to a JSON
    /// object, [`PolicyError::Parse`] if it does not serialize at all.
    pub fn filter_entity<T: Serialize>(
        &self,
        entity: &T,
        role: Role,
        resource: &str,
    ) -> PolicyResult<Entity> {
        match serde_json::to_value(entity)? {
            Value::Object(map) => Ok(self.filter_entity_fields(&map, role, resource)),
            _ => Err(PolicyError::NotAnObject),
        }
    }

    fn visible_fields_str(&self, role: &str, resource: &str) -> VisibleFields {
        match Role::parse(role) {
            Some(role) => self.visible_fields(role, resource),
            None => VisibleFields::Listed(Vec::new()),
        }
    }
}

fn mask(visible: &VisibleFields, entity: &Entity, role: &str, resource: &str) -> Entity {
    let filtered = visible.apply(entity);
    if filtered.len() < entity.len() {
        tracing::trace!(
            role = role,
            resource = resource,
            dropped = entity.len() - filtered.len(),
            "Masked entity fields"
        );
    }
    filtered
}
