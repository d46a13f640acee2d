//! # Resources
//!
//! Named entity types the policy table is keyed by. Resource names are
//! open-ended: anything not in the table is simply denied for non-admin roles.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A named entity/collection type (e.g. `"accounts"`, `"deals"`).
///
/// Compared literally. Use [`CrmResource`] for the names the CRM itself
/// manages; arbitrary names are still valid and resolve to default-deny.
///
/// # Example
///
/// ```
/// use crm_rbac::resources::{CrmResource, Resource};
///
/// let deals: Resource = CrmResource::Deals.into();
/// assert_eq!(deals.as_str(), "deals");
/// assert_eq!(Resource::new("portfolio").as_str(), "portfolio");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    /// Create a resource name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the resource name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The known CRM resource this name refers to, if any.
    pub fn known(&self) -> Option<CrmResource> {
        CrmResource::parse(&self.0)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Resource {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Resource {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Resource {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<CrmResource> for Resource {
    fn from(r: CrmResource) -> Self {
        Self::new(r.as_str())
    }
}

/// Resources managed by the CRM back office.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CrmResource {
    /// Companies (legal entities) the business works with.
    Accounts,
    /// People at those companies.
    Contacts,
    /// Sales opportunities.
    Deals,
    /// Support tickets.
    Tickets,
    /// Service requests submitted through the public site.
    ClientRequests,
    /// Back-office users, including HR fields.
    Users,
    /// Raw lead-capture form submissions.
    Leads,
}

impl CrmResource {
    /// Get the canonical resource name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrmResource::Accounts => "accounts",
            CrmResource::Contacts => "contacts",
            CrmResource::Deals => "deals",
            CrmResource::Tickets => "tickets",
            CrmResource::ClientRequests => "client_requests",
            CrmResource::Users => "users",
            CrmResource::Leads => "leads",
        }
    }

    /// Parse resource type from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports singular forms and aliases)
    ///
    /// # Returns
    ///
    /// `Some(CrmResource)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use crm_rbac::resources::CrmResource;
    ///
    /// assert_eq!(CrmResource::parse("account"), Some(CrmResource::Accounts));
    /// assert_eq!(CrmResource::parse("companies"), Some(CrmResource::Accounts));
    /// assert_eq!(CrmResource::parse("client-request"), Some(CrmResource::ClientRequests));
    /// assert_eq!(CrmResource::parse("portfolio"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "account" | "accounts" | "company" | "companies" => Some(CrmResource::Accounts),
            "contact" | "contacts" => Some(CrmResource::Contacts),
            "deal" | "deals" => Some(CrmResource::Deals),
            "ticket" | "tickets" => Some(CrmResource::Tickets),
            "client_request" | "client_requests" | "clientrequest" | "clientrequests"
            | "request" | "requests" => Some(CrmResource::ClientRequests),
            "user" | "users" => Some(CrmResource::Users),
            "lead" | "leads" => Some(CrmResource::Leads),
            _ => None,
        }
    }

    /// Get all CRM resources.
    pub fn all() -> Vec<Self> {
        vec![
            CrmResource::Accounts,
            CrmResource::Contacts,
            CrmResource::Deals,
            CrmResource::Tickets,
            CrmResource::ClientRequests,
            CrmResource::Users,
            CrmResource::Leads,
        ]
    }
}

impl fmt::Display for CrmResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_parsing() {
        assert_eq!(CrmResource::parse("accounts"), Some(CrmResource::Accounts));
        assert_eq!(CrmResource::parse("Company"), Some(CrmResource::Accounts));
        assert_eq!(CrmResource::parse("contact"), Some(CrmResource::Contacts));
        assert_eq!(CrmResource::parse("DEALS"), Some(CrmResource::Deals));
        assert_eq!(CrmResource::parse("ticket"), Some(CrmResource::Tickets));
        assert_eq!(
            CrmResource::parse("client_requests"),
            Some(CrmResource::ClientRequests)
        );
        assert_eq!(
            CrmResource::parse("client-requests"),
            Some(CrmResource::ClientRequests)
        );
        assert_eq!(CrmResource::parse("users"), Some(CrmResource::Users));
        assert_eq!(CrmResource::parse("lead"), Some(CrmResource::Leads));
        assert_eq!(CrmResource::parse("services"), None);
    }

    #[test]
    fn test_canonical_names_parse_back() {
        for r in CrmResource::all() {
            assert_eq!(CrmResource::parse(r.as_str()), Some(r));
        }
        assert_eq!(CrmResource::all().len(), 7);
    }

    #[test]
    fn test_resource_is_literal() {
        // Aliases are only resolved by `known()`; table lookups stay literal.
        let r = Resource::new("companies");
        assert_ne!(r, Resource::from(CrmResource::Accounts));
        assert_eq!(r.known(), Some(CrmResource::Accounts));
        assert_eq!(Resource::new("portfolio").known(), None);
    }

    #[test]
    fn test_resource_serde_transparent() {
        let r: Resource = serde_json::from_str("\"deals\"").unwrap();
        assert_eq!(r.as_str(), "deals");
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"deals\"");
    }
}
