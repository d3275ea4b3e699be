//! 授权中间件
//!
//! 为调用方识别和模块权限检查提供 Axum 中间件

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::ErrorCode;

use crate::auth::CurrentCaller;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// 识别中间件 - 要求请求带有调用方身份
///
/// 将 [`CurrentCaller`] 注入请求扩展，后续处理器可直接提取。
pub async fn require_caller(mut req: Request, next: Next) -> Result<Response, AppError> {
    let caller = resolve_caller(&req)?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// 权限检查中间件 - 要求 `module:action` 权限
///
/// 管理员角色直接放行；其余角色按存储中的授权判定。
/// 存储读取失败时无法确认授权，返回 403 (`AccessUnverifiable`)，不会放行。
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/roles", get(handler::list))
///     .layer(middleware::from_fn_with_state(state, require_permission("roles", "read")));
/// ```
///
/// # 错误
///
/// 无身份返回 401，无权限返回 403 Forbidden
pub fn require_permission(
    module: &'static str,
    action: &'static str,
) -> impl Fn(State<ServerState>, Request, Next) -> MiddlewareFuture + Clone {
    move |State(state): State<ServerState>, mut req: Request, next: Next| {
        Box::pin(async move {
            let caller = resolve_caller(&req)?;

            let allowed = state
                .permissions()
                .has_permission(caller.role_id, Some(module), Some(action))
                .await
                .map_err(|e| {
                    security_log!(
                        "ERROR",
                        "access_unverifiable",
                        role_id = caller.role_id,
                        required_permission = format!("{module}:{action}"),
                        error = e.message.clone()
                    );
                    AppError::with_message(
                        ErrorCode::AccessUnverifiable,
                        format!("Cannot verify access to {module}:{action}"),
                    )
                })?;

            if !allowed {
                security_log!(
                    "WARN",
                    "permission_denied",
                    role_id = caller.role_id,
                    user_id = caller.user_id.clone().unwrap_or_default(),
                    required_permission = format!("{module}:{action}")
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {module}:{action}"
                ))
                .with_detail("module", module)
                .with_detail("action", action));
            }

            req.extensions_mut().insert(caller);
            Ok(next.run(req).await)
        })
    }
}

fn resolve_caller(req: &Request) -> Result<CurrentCaller, AppError> {
    if let Some(caller) = req.extensions().get::<CurrentCaller>() {
        return Ok(caller.clone());
    }
    CurrentCaller::from_headers(req.headers()).inspect_err(|e| {
        security_log!(
            "WARN",
            "caller_rejected",
            error = e.message.clone(),
            uri = format!("{:?}", req.uri())
        );
    })
}
