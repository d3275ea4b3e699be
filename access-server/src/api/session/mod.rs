//! Session API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /session | GET | 调用方角色、分类和授权快照 |
//! | /session/navigate?module=&action= | GET | 服务器端路由守卫判定 |
//!
//! Both routes only require a caller; they answer questions about the
//! caller's own access.

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use serde::{Deserialize, Serialize};
use shared::access::{GuardDecision, RoleClass};
use shared::models::ModuleAction;

use crate::auth::{CurrentCaller, require_caller};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/session", get(current))
        .route("/session/navigate", get(navigate))
        .route_layer(middleware::from_fn(require_caller))
}

/// Access snapshot of the caller
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub role_class: RoleClass,
    pub is_admin: bool,
    /// Stored grants; empty for the administrator, whose access is implicit
    pub grants: Vec<ModuleAction>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub module: Option<String>,
    pub action: Option<String>,
}

async fn current(
    State(state): State<ServerState>,
    caller: CurrentCaller,
) -> AppResult<Json<SessionView>> {
    let snapshot = state.permissions().snapshot(caller.role_id).await?;
    Ok(Json(SessionView {
        role_id: caller.role_id,
        user_id: caller.user_id,
        role_class: state.classifier.classify(caller.role_id),
        is_admin: snapshot.is_admin(),
        grants: snapshot.grants.to_sorted_vec(),
    }))
}

/// Evaluate the route guard for the caller
///
/// A grant-store failure is not an HTTP error here: the session is marked
/// failed and the guard answers `denied` with reason `unverifiable`.
async fn navigate(
    State(state): State<ServerState>,
    caller: CurrentCaller,
    Query(query): Query<NavigateQuery>,
) -> Json<GuardDecision> {
    let session = state
        .permissions()
        .session(caller.role_id, state.classifier.as_ref())
        .await;
    let decision = state
        .guard
        .evaluate(&session, query.module.as_deref(), query.action.as_deref());
    tracing::debug!(role_id = caller.role_id, ?decision, "Navigation evaluated");
    Json(decision)
}
