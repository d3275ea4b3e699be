//! Role Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{ADMIN_ROLE_ID, Role};
use shared::util::now_millis;
use sqlx::SqlitePool;

const ROLE_COLUMNS: &str = "id, name, description, created_at, updated_at";

fn role_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}

fn name_taken(name: &str) -> RepoError {
    RepoError::Business(
        ErrorCode::RoleNameExists,
        format!("Role name '{name}' already exists"),
    )
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM role ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(roles)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM role WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM role WHERE name = ? LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

/// Whether a role with this id exists
pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM role WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Insert a role; `name` must already be validated
pub async fn create(pool: &SqlitePool, name: &str, description: Option<&str>) -> RepoResult<Role> {
    if find_by_name(pool, name).await?.is_some() {
        return Err(name_taken(name));
    }

    let now = now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO role (name, description, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(description)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        // concurrent insert of the same name
        RepoError::Duplicate(_) => name_taken(name),
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

/// Replace name and description of an existing role
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    description: Option<&str>,
) -> RepoResult<Role> {
    if let Some(other) = find_by_name(pool, name).await?
        && other.id != id
    {
        return Err(name_taken(name));
    }

    let rows = sqlx::query("UPDATE role SET name = ?, description = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => name_taken(name),
            other => other,
        })?;

    if rows.rows_affected() == 0 {
        return Err(role_not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| role_not_found(id))
}

/// Delete a role together with its permission rows
///
/// Both deletes run in one transaction; the administrator role can never be
/// deleted.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if id == ADMIN_ROLE_ID {
        return Err(RepoError::Business(
            ErrorCode::CannotDeleteAdmin,
            "Cannot delete the administrator role".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM role_permission WHERE role_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let rows = sqlx::query("DELETE FROM role WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(role_not_found(id));
    }

    tx.commit().await?;
    tracing::debug!(role_id = id, permissions_removed = removed, "Role deleted");
    Ok(true)
}
