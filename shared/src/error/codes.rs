//! Unified error codes for the access engine
//!
//! This module defines all error codes shared by access-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Role errors
//! - 4xxx: Module catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,

    // ==================== 1xxx: Auth ====================
    /// Caller identity is missing
    NotAuthenticated = 1001,
    /// Caller identity headers are malformed
    CallerInvalid = 1002,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Cannot modify the administrator role
    CannotModifyAdmin = 2004,
    /// Cannot delete the administrator role
    CannotDeleteAdmin = 2005,
    /// Permission data could not be loaded, access cannot be verified
    AccessUnverifiable = 2006,

    // ==================== 3xxx: Role ====================
    /// Role not found
    RoleNotFound = 3001,
    /// Role name already exists
    RoleNameExists = 3002,
    /// Role name is empty
    RoleNameEmpty = 3003,

    // ==================== 4xxx: Catalog ====================
    /// Module is not part of the catalog
    UnknownModule = 4001,
    /// Action is not part of the action vocabulary
    UnknownAction = 4002,
    /// (module, action) pair is not offered by the catalog
    ModuleActionNotInCatalog = 4003,
    /// Catalog definition is malformed
    CatalogInvalid = 4004,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",

            // Auth
            ErrorCode::NotAuthenticated => "Caller is not authenticated",
            ErrorCode::CallerInvalid => "Caller identity is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::CannotModifyAdmin => "Cannot modify the administrator role",
            ErrorCode::CannotDeleteAdmin => "Cannot delete the administrator role",
            ErrorCode::AccessUnverifiable => "Cannot verify access",

            // Role
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleNameEmpty => "Role name must not be empty",

            // Catalog
            ErrorCode::UnknownModule => "Unknown module",
            ErrorCode::UnknownAction => "Unknown action",
            ErrorCode::ModuleActionNotInCatalog => "Module action is not in the catalog",
            ErrorCode::CatalogInvalid => "Module catalog is invalid",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::CallerInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2004 => Ok(ErrorCode::CannotModifyAdmin),
            2005 => Ok(ErrorCode::CannotDeleteAdmin),
            2006 => Ok(ErrorCode::AccessUnverifiable),

            // Role
            3001 => Ok(ErrorCode::RoleNotFound),
            3002 => Ok(ErrorCode::RoleNameExists),
            3003 => Ok(ErrorCode::RoleNameEmpty),

            // Catalog
            4001 => Ok(ErrorCode::UnknownModule),
            4002 => Ok(ErrorCode::UnknownAction),
            4003 => Ok(ErrorCode::ModuleActionNotInCatalog),
            4004 => Ok(ErrorCode::CatalogInvalid),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
