//! Role API Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use shared::access::MatrixView;
use shared::models::{Permission, PermissionSave, Role, RoleCreate, RoleUpdate};

use crate::auth::CurrentCaller;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /roles - All roles ordered by id
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Role>>> {
    let roles = state.roles().list_roles().await?;
    Ok(Json(roles))
}

/// GET /roles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Role>> {
    Ok(Json(state.roles().get_role(id).await?))
}

/// POST /roles - Create a new role
pub async fn create(
    State(state): State<ServerState>,
    caller: CurrentCaller,
    Json(payload): Json<RoleCreate>,
) -> AppResult<(StatusCode, Json<Role>)> {
    let role = state.roles().create_role(payload).await?;
    tracing::info!(
        role_id = role.id,
        by_role = caller.role_id,
        by_user = caller.user_id.as_deref().unwrap_or("-"),
        "Role created via API"
    );
    Ok((StatusCode::CREATED, Json(role)))
}

/// PUT /roles/{id} - Replace name and description
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<Role>> {
    Ok(Json(state.roles().update_role(id, payload).await?))
}

/// DELETE /roles/{id} - Delete role and its permissions
pub async fn delete(
    State(state): State<ServerState>,
    caller: CurrentCaller,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.roles().delete_role(id).await?;
    tracing::info!(role_id = id, by_role = caller.role_id, "Role deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /roles/{id}/permissions - Persisted permission rows
pub async fn get_role_permissions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Permission>>> {
    Ok(Json(state.permissions().list_permissions(id).await?))
}

/// POST /roles/{id}/permissions - Full replace of the role's permission set
pub async fn save_role_permissions(
    State(state): State<ServerState>,
    caller: CurrentCaller,
    Path(id): Path<i64>,
    Json(payload): Json<PermissionSave>,
) -> AppResult<Json<Vec<Permission>>> {
    let saved = state.permissions().save(id, &payload.permissions).await?;
    tracing::info!(
        role_id = id,
        by_role = caller.role_id,
        count = saved.len(),
        "Role permissions saved via API"
    );
    Ok(Json(saved))
}

/// GET /roles/{id}/matrix - Module × action grid for the permission editor
pub async fn get_matrix(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MatrixView>> {
    let matrix = state.permissions().load_matrix(id).await?;
    Ok(Json(matrix.to_view()))
}
