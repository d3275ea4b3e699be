//! Permission Service
//!
//! Matrix loading, full-replace saves and the server-side access check.
//!
//! # 保存流程
//!
//! ```text
//! payload ──▶ admin? ──▶ catalog.validate (全部或全不) ──▶ replace_for_role (单事务)
//!              │403            │400 rejected[]                  │404 unknown role
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use shared::access::{
    AccessSession, AccessSnapshot, GrantSet, ModuleCatalog, PermissionMatrix, RolePredicates,
    has_permission,
};
use shared::error::ErrorCode;
use shared::models::{ADMIN_ROLE_ID, ModuleAction, Permission};
use sqlx::SqlitePool;

use crate::db::repository::{permission, role};
use crate::utils::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct PermissionService {
    pool: SqlitePool,
    catalog: Arc<ModuleCatalog>,
}

impl PermissionService {
    pub fn new(pool: SqlitePool, catalog: Arc<ModuleCatalog>) -> Self {
        Self { pool, catalog }
    }

    /// Permission rows of a role that the catalog still offers
    pub async fn list_permissions(&self, role_id: i64) -> AppResult<Vec<Permission>> {
        self.ensure_role(role_id).await?;
        let rows = permission::find_by_role(&self.pool, role_id).await?;
        Ok(rows
            .into_iter()
            .filter(|row| self.catalog.contains(&row.module, &row.action))
            .collect())
    }

    /// Effective grant set of a role (empty for the administrator)
    ///
    /// Stored pairs the catalog no longer offers are ignored, so the answer
    /// always agrees with what the matrix shows.
    pub async fn grants(&self, role_id: i64) -> AppResult<GrantSet> {
        let rows = permission::find_grants(&self.pool, role_id).await?;
        let (grants, stale): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .partition(|pair| self.catalog.contains(&pair.module, &pair.action));
        if !stale.is_empty() {
            tracing::debug!(role_id, stale = stale.len(), "Ignoring grants outside the catalog");
        }
        Ok(grants.into_iter().collect())
    }

    /// Project the catalog and the role's grants into an editable matrix
    pub async fn load_matrix(&self, role_id: i64) -> AppResult<PermissionMatrix> {
        self.ensure_role(role_id).await?;
        let persisted = permission::find_grants(&self.pool, role_id).await?;
        Ok(PermissionMatrix::build(role_id, &self.catalog, &persisted))
    }

    /// Replace the role's permission set
    ///
    /// Every pair is checked against the catalog before anything is written;
    /// one unknown pair rejects the whole payload and leaves the stored set
    /// untouched. Returns the new persisted rows.
    pub async fn save(&self, role_id: i64, staged: &[ModuleAction]) -> AppResult<Vec<Permission>> {
        if role_id == ADMIN_ROLE_ID {
            return Err(AppError::with_message(
                ErrorCode::CannotModifyAdmin,
                "Administrator permissions are implicit and cannot be edited",
            ));
        }

        let accepted = self.catalog.validate(staged)?;

        let previous: BTreeSet<ModuleAction> = permission::find_grants(&self.pool, role_id)
            .await?
            .into_iter()
            .collect();

        let saved = permission::replace_for_role(&self.pool, role_id, &accepted).await?;

        tracing::info!(
            role_id,
            total = saved.len(),
            granted = accepted.difference(&previous).count(),
            revoked = previous.difference(&accepted).count(),
            "Role permissions replaced"
        );
        Ok(saved)
    }

    /// Persist the staged state of an edited matrix
    pub async fn save_matrix(&self, matrix: &PermissionMatrix) -> AppResult<Vec<Permission>> {
        let staged: Vec<ModuleAction> = matrix.staged().into_iter().collect();
        self.save(matrix.role_id(), &staged).await
    }

    /// Server-side access check
    ///
    /// Administrator and missing module are decided without touching the
    /// store. A storage failure is returned as an error, never as a grant.
    pub async fn has_permission(
        &self,
        role_id: i64,
        module: Option<&str>,
        action: Option<&str>,
    ) -> AppResult<bool> {
        let needs_store =
            role_id != ADMIN_ROLE_ID && module.is_some_and(|m| !m.trim().is_empty());
        let grants = if needs_store {
            self.grants(role_id).await?
        } else {
            GrantSet::new()
        };
        Ok(has_permission(role_id, &grants, module, action))
    }

    /// Client-style snapshot of a role's grants
    pub async fn snapshot(&self, role_id: i64) -> AppResult<AccessSnapshot> {
        Ok(AccessSnapshot::new(role_id, self.grants(role_id).await?))
    }

    /// Build a route guard session; a failed load yields a failed session
    pub async fn session(
        &self,
        role_id: i64,
        predicates: &(dyn RolePredicates + Sync),
    ) -> AccessSession {
        let mut session = AccessSession::new(role_id, predicates);
        match self.grants(role_id).await {
            Ok(grants) => session.loaded(grants),
            Err(e) => {
                tracing::warn!(role_id, error = %e, "Failed to load grants for session");
                session.failed(e.message);
            }
        }
        session
    }

    async fn ensure_role(&self, role_id: i64) -> AppResult<()> {
        if role::exists(&self.pool, role_id).await? {
            Ok(())
        } else {
            Err(AppError::role_not_found(role_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn setup() -> (PermissionService, i64) {
        let pool = DbService::in_memory().await.unwrap().pool;
        let viewer = role::create(&pool, "Viewer", None).await.unwrap();
        (
            PermissionService::new(pool, Arc::new(ModuleCatalog::builtin())),
            viewer.id,
        )
    }

    #[tokio::test]
    async fn test_save_then_build_round_trip() {
        let (service, role_id) = setup().await;
        let staged = vec![
            ModuleAction::new("leads", "read"),
            ModuleAction::new("customers", "view"),
            ModuleAction::new("leads", "read"),
        ];
        let saved = service.save(role_id, &staged).await.unwrap();
        assert_eq!(saved.len(), 2);

        let matrix = service.load_matrix(role_id).await.unwrap();
        let expected: BTreeSet<ModuleAction> = staged.into_iter().collect();
        assert_eq!(matrix.staged(), expected);
    }

    #[tokio::test]
    async fn test_invalid_save_leaves_store_unchanged() {
        let (service, role_id) = setup().await;
        service
            .save(role_id, &[ModuleAction::new("leads", "read")])
            .await
            .unwrap();

        let err = service
            .save(
                role_id,
                &[
                    ModuleAction::new("sales", "read"),
                    ModuleAction::new("payroll", "read"),
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ModuleActionNotInCatalog);

        let rows = service.list_permissions(role_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].module_action(), ModuleAction::new("leads", "read"));
    }

    #[tokio::test]
    async fn test_save_admin_forbidden() {
        let (service, _) = setup().await;
        let err = service.save(ADMIN_ROLE_ID, &[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotModifyAdmin);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_role() {
        let (service, _) = setup().await;
        assert_eq!(
            service.load_matrix(99).await.unwrap_err().code,
            ErrorCode::RoleNotFound
        );
        assert_eq!(
            service.save(99, &[]).await.unwrap_err().code,
            ErrorCode::RoleNotFound
        );
    }

    #[tokio::test]
    async fn test_save_matrix_after_toggle() {
        let (service, role_id) = setup().await;
        let mut matrix = service.load_matrix(role_id).await.unwrap();
        matrix.toggle("reports", "view").unwrap();
        service.save_matrix(&matrix).await.unwrap();

        assert!(service
            .has_permission(role_id, Some("reports"), Some("view"))
            .await
            .unwrap());
        assert!(!service.has_permission(role_id, Some("reports"), None).await.unwrap());
    }

    #[tokio::test]
    async fn test_viewer_with_narrow_catalog() {
        let pool = DbService::in_memory().await.unwrap().pool;
        sqlx::query("INSERT INTO role (id, name, created_at, updated_at) VALUES (7, 'Viewer', 0, 0)")
            .execute(&pool)
            .await
            .unwrap();
        let catalog =
            ModuleCatalog::from_json(r#"{"leads": ["read"], "customers": ["read", "view"]}"#)
                .unwrap();
        let service = PermissionService::new(pool, Arc::new(catalog));

        service.save(7, &[ModuleAction::new("leads", "read")]).await.unwrap();
        assert!(service.has_permission(7, Some("leads"), Some("read")).await.unwrap());
        assert!(!service.has_permission(7, Some("customers"), Some("view")).await.unwrap());
        assert!(!service.has_permission(7, Some("leads"), Some("delete")).await.unwrap());

        // leads:delete is not offered by this catalog, whatever the role
        let err = service
            .save(7, &[ModuleAction::new("leads", "delete")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ModuleActionNotInCatalog);
        let matrix = service.load_matrix(7).await.unwrap();
        assert_eq!(
            matrix.staged(),
            BTreeSet::from([ModuleAction::new("leads", "read")])
        );
    }

    #[tokio::test]
    async fn test_stale_rows_grant_nothing() {
        let pool = DbService::in_memory().await.unwrap().pool;
        sqlx::query("INSERT INTO role (id, name, created_at, updated_at) VALUES (7, 'Viewer', 0, 0)")
            .execute(&pool)
            .await
            .unwrap();
        for (module, action) in [("leads", "read"), ("leads", "delete"), ("payroll", "read")] {
            sqlx::query("INSERT INTO role_permission (role_id, module, action) VALUES (7, ?, ?)")
                .bind(module)
                .bind(action)
                .execute(&pool)
                .await
                .unwrap();
        }
        let catalog =
            ModuleCatalog::from_json(r#"{"leads": ["read"], "customers": ["read", "view"]}"#)
                .unwrap();
        let service = PermissionService::new(pool, Arc::new(catalog));

        let matrix = service.load_matrix(7).await.unwrap();
        assert_eq!(
            matrix.staged(),
            BTreeSet::from([ModuleAction::new("leads", "read")])
        );
        assert!(service.has_permission(7, Some("leads"), Some("read")).await.unwrap());
        assert!(!service.has_permission(7, Some("leads"), Some("delete")).await.unwrap());
        assert!(!service.has_permission(7, Some("payroll"), Some("read")).await.unwrap());

        let rows = service.list_permissions(7).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].module_action(), ModuleAction::new("leads", "read"));

        let snapshot = service.snapshot(7).await.unwrap();
        assert!(!snapshot.has_permission(Some("leads"), Some("delete")));
        assert_eq!(
            snapshot.grants.to_sorted_vec(),
            vec![ModuleAction::new("leads", "read")]
        );
    }

    #[tokio::test]
    async fn test_session_fails_closed_when_store_is_down() {
        let (service, role_id) = setup().await;
        service
            .save(role_id, &[ModuleAction::new("leads", "read")])
            .await
            .unwrap();
        service.pool.close().await;

        let predicates = shared::access::RoleClassifier::default();
        let session = service.session(role_id, &predicates).await;
        assert!(matches!(session.load_state(), shared::access::LoadState::Failed(_)));
        assert_eq!(
            service
                .has_permission(role_id, Some("leads"), Some("read"))
                .await
                .unwrap_err()
                .code,
            ErrorCode::DatabaseError
        );
    }

    #[tokio::test]
    async fn test_has_permission_rules() {
        let (service, role_id) = setup().await;
        assert!(service.has_permission(ADMIN_ROLE_ID, Some("anything"), Some("delete")).await.unwrap());
        assert!(service.has_permission(ADMIN_ROLE_ID, None, None).await.unwrap());
        assert!(!service.has_permission(role_id, Some(""), None).await.unwrap());
        assert!(!service.has_permission(role_id, None, Some("read")).await.unwrap());
    }
}
