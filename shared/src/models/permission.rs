//! Permission Model
//!
//! `module` / `action` stay plain strings at the storage and wire boundary;
//! [`Action`] is the typed vocabulary used once a pair has been checked
//! against the module catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical action vocabulary.
///
/// Declaration order is the display priority (`view, create, read, update,
/// delete`); it carries no meaning for access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// All actions in display order
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not part of the action vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// A `(module, action)` pair, e.g. `leads:read`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ModuleAction {
    pub module: String,
    pub action: String,
}

impl ModuleAction {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.action)
    }
}

/// Persisted grant row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub role_id: i64,
    pub module: String,
    pub action: String,
}

impl Permission {
    pub fn module_action(&self) -> ModuleAction {
        ModuleAction::new(&self.module, &self.action)
    }
}

/// Full-replace save payload for `POST /roles/{id}/permissions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSave {
    #[serde(default)]
    pub permissions: Vec<ModuleAction>,
}
