//! Role API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /roles | GET | roles:read |
//! | /roles/{id} | GET | roles:read |
//! | /roles/{id}/permissions | GET | roles:read |
//! | /roles/{id}/matrix | GET | roles:read |
//! | /roles | POST | roles:create |
//! | /roles/{id} | PUT | roles:update |
//! | /roles/{id}/permissions | POST | roles:update |
//! | /roles/{id} | DELETE | roles:delete |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

/// Role router - every route requires a caller and the matching roles permission
pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/roles", get(handler::list))
        .route("/roles/{id}", get(handler::get_by_id))
        .route("/roles/{id}/permissions", get(handler::get_role_permissions))
        .route("/roles/{id}/matrix", get(handler::get_matrix))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("roles", "read"),
        ));

    let create_routes = Router::new()
        .route("/roles", post(handler::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("roles", "create"),
        ));

    let update_routes = Router::new()
        .route("/roles/{id}", put(handler::update))
        .route("/roles/{id}/permissions", post(handler::save_role_permissions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("roles", "update"),
        ));

    let delete_routes = Router::new()
        .route("/roles/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("roles", "delete"),
        ));

    read_routes
        .merge(create_routes)
        .merge(update_routes)
        .merge(delete_routes)
}
