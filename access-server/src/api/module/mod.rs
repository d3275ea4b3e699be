//! Module catalog API
//!
//! `GET /modules` lists every `(module, action)` pair the permission editor
//! can offer, grouped by module with actions in display order.

use axum::{Json, Router, extract::State, middleware, routing::get};
use shared::models::ModuleAction;

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/modules", get(list))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("roles", "read"),
        ))
}

async fn list(State(state): State<ServerState>) -> Json<Vec<ModuleAction>> {
    Json(state.catalog.entries())
}
