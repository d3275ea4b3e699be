//! Access engine
//!
//! Pure RBAC logic shared by the server and its clients:
//!
//! - [`catalog`] - module catalog lookup table and payload validation
//! - [`grants`] - indexed grant set of one role
//! - [`decision`] - `has_permission`, the single access predicate
//! - [`matrix`] - permission matrix build / toggle / diff
//! - [`classify`] - closed role classification for redirect routing
//! - [`guard`] - route guard state machine and redirect policy

pub mod catalog;
pub mod classify;
pub mod decision;
pub mod grants;
pub mod guard;
pub mod matrix;

pub use catalog::{CatalogDefinition, ModuleCatalog};
pub use classify::{RoleClass, RoleClassifier, RolePredicates};
pub use decision::{AccessSnapshot, DEFAULT_ACTION, effective_action, has_permission};
pub use grants::GrantSet;
pub use guard::{AccessSession, DenyReason, Destinations, GuardDecision, LoadState, RouteGuard};
pub use matrix::{MatrixCell, MatrixDiff, MatrixRow, MatrixView, PermissionMatrix};
