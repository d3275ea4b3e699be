//! Role Model

use serde::{Deserialize, Serialize};

/// Reserved id of the Administrator role.
///
/// The administrator is allowed everything; that power is hard-coded in the
/// decision function and never stored as permission rows.
pub const ADMIN_ROLE_ID: i64 = 1;

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        self.id == ADMIN_ROLE_ID
    }
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Update role payload (full replacement of name and description)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
