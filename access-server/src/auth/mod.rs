//! 认证模块
//!
//! 调用方身份由上游认证层通过请求头传入，本服务只负责授权。

mod caller;
mod middleware;

pub use caller::{CurrentCaller, ROLE_ID_HEADER, USER_ID_HEADER};
pub use middleware::{require_caller, require_permission};
