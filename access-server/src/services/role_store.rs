//! Role Store
//!
//! Validation and logging on top of the role repository.

use shared::error::ErrorCode;
use shared::models::{Role, RoleCreate, RoleUpdate};
use sqlx::SqlitePool;

use crate::db::repository::role;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct RoleStore {
    pool: SqlitePool,
}

impl RoleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All roles, ordered by id
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(role::find_all(&self.pool).await?)
    }

    pub async fn get_role(&self, id: i64) -> AppResult<Role> {
        role::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::role_not_found(id))
    }

    pub async fn create_role(&self, data: RoleCreate) -> AppResult<Role> {
        let name = normalize_name(&data.name)?;
        let description = normalize_description(data.description)?;

        let created = role::create(&self.pool, &name, description.as_deref()).await?;
        tracing::info!(role_id = created.id, name = %created.name, "Role created");
        Ok(created)
    }

    /// Replace name and description
    ///
    /// The administrator role may be renamed; its access is bound to the id.
    pub async fn update_role(&self, id: i64, data: RoleUpdate) -> AppResult<Role> {
        let name = normalize_name(&data.name)?;
        let description = normalize_description(data.description)?;

        let updated = role::update(&self.pool, id, &name, description.as_deref()).await?;
        tracing::info!(role_id = id, name = %updated.name, "Role updated");
        Ok(updated)
    }

    /// Delete a role and its permission rows
    pub async fn delete_role(&self, id: i64) -> AppResult<()> {
        role::delete(&self.pool, id).await?;
        tracing::info!(role_id = id, "Role deleted");
        Ok(())
    }
}

fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RoleNameEmpty,
            "Role name must not be empty",
        )
        .with_detail("field", "name"));
    }
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    Ok(name.to_string())
}

fn normalize_description(raw: Option<String>) -> AppResult<Option<String>> {
    let description = raw
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    validate_optional_text(&description, "description", MAX_NOTE_LEN)?;
    Ok(description)
}
