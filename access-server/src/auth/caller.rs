//! Caller context
//!
//! Explicit per-request identity instead of an ambient "current user".

use axum::{extract::FromRequestParts, http::request::Parts};
use http::HeaderMap;
use serde::Serialize;

use crate::security_log;
use crate::utils::AppError;

/// Role id of the authenticated caller
pub const ROLE_ID_HEADER: &str = "x-role-id";
/// Optional user id, only used for logging
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentCaller {
    pub role_id: i64,
    pub user_id: Option<String>,
}

impl CurrentCaller {
    /// Read the caller from request headers
    ///
    /// | 情况 | 错误 |
    /// |------|------|
    /// | 无 `x-role-id` | 401 NotAuthenticated |
    /// | 非正整数 | 401 CallerInvalid |
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let raw = headers
            .get(ROLE_ID_HEADER)
            .ok_or_else(AppError::not_authenticated)?
            .to_str()
            .map_err(|_| AppError::caller_invalid("Role id header is not valid text"))?;

        let role_id = raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::caller_invalid(format!("Invalid role id '{raw}'"))
                    .with_detail("header", ROLE_ID_HEADER)
            })?;

        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(Self { role_id, user_id })
    }
}

impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(caller) = parts.extensions.get::<CurrentCaller>() {
            return Ok(caller.clone());
        }

        match CurrentCaller::from_headers(&parts.headers) {
            Ok(caller) => {
                parts.extensions.insert(caller.clone());
                Ok(caller)
            }
            Err(e) => {
                security_log!(
                    "WARN",
                    "caller_rejected",
                    error = e.message.clone(),
                    uri = format!("{:?}", parts.uri)
                );
                Err(e)
            }
        }
    }
}
