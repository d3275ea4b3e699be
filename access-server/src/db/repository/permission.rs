//! Role Permission Repository
//!
//! `role_permission` rows are only ever written as a whole set per role.

use std::collections::BTreeSet;

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{ModuleAction, Permission};
use sqlx::SqlitePool;

pub async fn find_by_role(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<Permission>> {
    let rows = sqlx::query_as::<_, Permission>(
        "SELECT role_id, module, action FROM role_permission WHERE role_id = ? ORDER BY module, action",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Grants of a role as bare `(module, action)` pairs
pub async fn find_grants(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<ModuleAction>> {
    let rows = sqlx::query_as::<_, ModuleAction>(
        "SELECT module, action FROM role_permission WHERE role_id = ?",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn exists(pool: &SqlitePool, role_id: i64, module: &str, action: &str) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM role_permission WHERE role_id = ? AND module = ? AND action = ?",
    )
    .bind(role_id)
    .bind(module)
    .bind(action)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Replace every permission row of a role with `grants`
///
/// Delete and inserts share one transaction, so readers observe either the
/// previous set or the new one. Fails with `RoleNotFound` if the role does
/// not exist.
pub async fn replace_for_role(
    pool: &SqlitePool,
    role_id: i64,
    grants: &BTreeSet<ModuleAction>,
) -> RepoResult<Vec<Permission>> {
    let mut tx = pool.begin().await?;

    let role: Option<i64> = sqlx::query_scalar("SELECT id FROM role WHERE id = ?")
        .bind(role_id)
        .fetch_optional(&mut *tx)
        .await?;
    if role.is_none() {
        tx.rollback().await?;
        return Err(RepoError::Business(
            ErrorCode::RoleNotFound,
            format!("Role {role_id} not found"),
        ));
    }

    sqlx::query("DELETE FROM role_permission WHERE role_id = ?")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    for grant in grants {
        sqlx::query("INSERT INTO role_permission (role_id, module, action) VALUES (?, ?, ?)")
            .bind(role_id)
            .bind(&grant.module)
            .bind(&grant.action)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    find_by_role(pool, role_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::role;

    #[tokio::test]
    async fn test_replace_is_full_replace() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let viewer = role::create(&pool, "Viewer", None).await.unwrap();

        let first = BTreeSet::from([
            ModuleAction::new("leads", "read"),
            ModuleAction::new("sales", "read"),
        ]);
        replace_for_role(&pool, viewer.id, &first).await.unwrap();

        let second = BTreeSet::from([ModuleAction::new("customers", "view")]);
        let saved = replace_for_role(&pool, viewer.id, &second).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].module_action(), ModuleAction::new("customers", "view"));
        assert!(!exists(&pool, viewer.id, "leads", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_unknown_role() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let err = replace_for_role(&pool, 77, &BTreeSet::new()).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleNotFound, _)));
    }

    #[tokio::test]
    async fn test_role_delete_cascades() {
        let pool = DbService::in_memory().await.unwrap().pool;
        let viewer = role::create(&pool, "Viewer", None).await.unwrap();
        let grants = BTreeSet::from([ModuleAction::new("leads", "read")]);
        replace_for_role(&pool, viewer.id, &grants).await.unwrap();

        role::delete(&pool, viewer.id).await.unwrap();

        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_permission WHERE role_id = ?")
            .bind(viewer.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }
}
