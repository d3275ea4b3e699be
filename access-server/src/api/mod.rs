//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`role`] - 角色管理与权限矩阵接口
//! - [`module`] - 模块目录接口
//! - [`session`] - 当前调用方的访问快照与导航判定

pub mod health;
pub mod module;
pub mod role;
pub mod session;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Assemble every API router and bind the state
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(role::router(&state))
        .merge(module::router(&state))
        .merge(session::router())
        .with_state(state)
}
