//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound | Self::RoleNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::CallerInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::CannotModifyAdmin
            | Self::CannotDeleteAdmin
            | Self::AccessUnverifiable => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::DatabaseError
            | Self::ConfigError
            | Self::CatalogInvalid => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation, duplicate role name, unknown module/action)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
