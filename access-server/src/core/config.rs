use std::collections::BTreeSet;
use std::path::PathBuf;

use shared::access::{Destinations, RoleClassifier, RouteGuard};

/// 服务器配置 - 访问控制服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/access | 工作目录 |
/// | DATABASE_PATH | {WORK_DIR}/access.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
/// | CATALOG_PATH | (无) | 模块目录 JSON 文件，未设置使用内置目录 |
/// | HOME_MODULE | dashboard | 主仪表盘所属模块 |
/// | LEAD_GEN_ROLE_IDS | (空) | lead-gen 角色 id，逗号分隔 |
/// | FRONT_SALES_ROLE_IDS | (空) | front-sales 角色 id |
/// | UPSELL_ROLE_IDS | (空) | upsell 角色 id |
/// | DEFAULT_DASHBOARD_PATH | /dashboard | 默认跳转 |
/// | LEAD_GEN_DASHBOARD_PATH | /lead-gen/dashboard | |
/// | FRONT_SALES_DASHBOARD_PATH | /front-sales/dashboard | |
/// | UPSELL_DASHBOARD_PATH | /upsell/dashboard | |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/access HTTP_PORT=8080 LEAD_GEN_ROLE_IDS=4,5 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 模块目录覆盖文件
    pub catalog_path: Option<String>,
    /// 主仪表盘模块 (拒绝时触发分类回退)
    pub home_module: String,
    pub lead_gen_role_ids: BTreeSet<i64>,
    pub front_sales_role_ids: BTreeSet<i64>,
    pub upsell_role_ids: BTreeSet<i64>,
    /// 拒绝后的跳转目标
    pub destinations: Destinations,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/access".into());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("access.db")
                .to_string_lossy()
                .into_owned()
        });
        let defaults = Destinations::default();

        Self {
            database_path,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            catalog_path: std::env::var("CATALOG_PATH").ok().filter(|p| !p.is_empty()),
            home_module: std::env::var("HOME_MODULE").unwrap_or_else(|_| "dashboard".into()),
            lead_gen_role_ids: role_ids_from_env("LEAD_GEN_ROLE_IDS"),
            front_sales_role_ids: role_ids_from_env("FRONT_SALES_ROLE_IDS"),
            upsell_role_ids: role_ids_from_env("UPSELL_ROLE_IDS"),
            destinations: Destinations {
                default_dashboard: std::env::var("DEFAULT_DASHBOARD_PATH")
                    .unwrap_or(defaults.default_dashboard),
                lead_gen_dashboard: std::env::var("LEAD_GEN_DASHBOARD_PATH")
                    .unwrap_or(defaults.lead_gen_dashboard),
                front_sales_dashboard: std::env::var("FRONT_SALES_DASHBOARD_PATH")
                    .unwrap_or(defaults.front_sales_dashboard),
                upsell_dashboard: std::env::var("UPSELL_DASHBOARD_PATH")
                    .unwrap_or(defaults.upsell_dashboard),
            },
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, database_path: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = database_path.into();
        config
    }

    /// 角色分类器 (lead-gen / front-sales / upsell)
    pub fn classifier(&self) -> RoleClassifier {
        RoleClassifier::new(
            self.lead_gen_role_ids.iter().copied(),
            self.front_sales_role_ids.iter().copied(),
            self.upsell_role_ids.iter().copied(),
        )
    }

    /// 路由守卫及其跳转策略
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.home_module.clone(), self.destinations.clone())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn role_ids_from_env(key: &str) -> BTreeSet<i64> {
    std::env::var(key)
        .map(|raw| parse_role_ids(&raw))
        .unwrap_or_default()
}

/// 解析逗号分隔的角色 id 列表
///
/// 非数字或非正数的项被忽略并记录警告。
pub fn parse_role_ids(raw: &str) -> BTreeSet<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<i64>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                tracing::warn!(value = s, "Ignoring invalid role id in configuration");
                None
            }
        })
        .collect()
}
