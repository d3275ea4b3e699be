//! Access Server - 角色权限 (RBAC) 服务
//!
//! # 架构概述
//!
//! - **数据库** (`db`): SQLite (sqlx) 存储角色与权限行
//! - **认证** (`auth`): 调用方识别与 `module:action` 权限中间件
//! - **服务** (`services`): 角色存储、权限矩阵保存、访问判定
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! 纯访问逻辑 (判定函数、权限矩阵、路由守卫) 位于 `shared::access`。
//!
//! # 模块结构
//!
//! ```text
//! access-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # 调用方、权限中间件
//! ├── services/      # 目录加载、角色、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::CurrentCaller;
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: dotenv、工作目录、日志
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(
        Some(&config.log_level),
        Some(config.is_production()),
        config.log_dir.as_deref(),
    );
    Ok(config)
}
