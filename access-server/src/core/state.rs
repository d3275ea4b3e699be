use std::sync::Arc;

use shared::access::{ModuleCatalog, RoleClassifier, RouteGuard};
use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::services::{PermissionService, RoleStore, catalog::load_catalog};
use crate::utils::AppResult;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | catalog | Arc<ModuleCatalog> | 模块目录 (启动时加载) |
/// | classifier | Arc<RoleClassifier> | 角色分类 |
/// | guard | Arc<RouteGuard> | 路由守卫跳转策略 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    pub catalog: Arc<ModuleCatalog>,
    pub classifier: Arc<RoleClassifier>,
    pub guard: Arc<RouteGuard>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替；测试用它注入内存数据库。
    pub fn new(config: Config, pool: SqlitePool, catalog: ModuleCatalog) -> Self {
        Self {
            classifier: Arc::new(config.classifier()),
            guard: Arc::new(config.route_guard()),
            catalog: Arc::new(catalog),
            pool,
            config,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 加载模块目录 (内置或 CATALOG_PATH)
    /// 2. 打开数据库并执行迁移
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let catalog = load_catalog(config.catalog_path.as_deref())?;
        let db = DbService::new(&config.database_path).await?;
        tracing::info!(
            database = %config.database_path,
            home_module = %config.home_module,
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), db.pool, catalog))
    }

    pub fn roles(&self) -> RoleStore {
        RoleStore::new(self.pool.clone())
    }

    pub fn permissions(&self) -> PermissionService {
        PermissionService::new(self.pool.clone(), self.catalog.clone())
    }
}
