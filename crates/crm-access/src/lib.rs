//! # CRM Access
//!
//! This crate is the consumer side of `crm-rbac`: the guard that route
//! handlers and renderers in the CRM back office call before acting on or
//! returning an entity.
//!
//! ## Overview
//!
//! The crm-access crate handles:
//! - **Actor**: the acting user as resolved from the session
//! - **Guard**: permission checks before mutations and protected views
//! - **Rendering**: field masking before an entity leaves the server
//! - **Audit**: a decision record per check, logged through `tracing`
//! - **Config**: policy source and audit toggle from the environment
//!
//! ## Usage
//!
//! ```rust,no_run
//! use crm_access::{AccessConfig, AccessGuard, Actor};
//! use uuid::Uuid;
//!
//! // At startup: load the policy once and share the guard.
//! let config = AccessConfig::from_env()?;
//! let guard = AccessGuard::from_config(&config)?;
//!
//! // Per request.
//! let actor = Actor::new(Uuid::now_v7(), "manager").with_team("north");
//! guard.authorize(&actor, "accounts", "export", None)?;
//! # Ok::<(), crm_access::AccessError>(())
//! ```
//!
//! ## Contracts
//!
//! - A guard denies with [`AccessError::Forbidden`] (HTTP 403); callers
//!   redirect or reject on it.
//! - Renderers return a new object; the entity fetched from storage is never
//!   handed downstream.
//! - This crate never fetches or persists data; entities and records come
//!   from the caller.

pub mod actor;
pub mod audit;
pub mod config;
pub mod error;
pub mod guard;

// Re-export main types
pub use actor::Actor;
pub use audit::AccessDecision;
pub use config::{AccessConfig, ConfigError};
pub use error::{AccessError, AccessResult};
pub use guard::AccessGuard;
