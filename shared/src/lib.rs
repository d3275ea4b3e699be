//! Shared types for the access engine
//!
//! Wire models, the unified error system and the pure access logic
//! (decision function, permission matrix, route guard) used by
//! access-server and by clients.

pub mod access;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{ADMIN_ROLE_ID, Action, ModuleAction, Permission, Role};
