//! 服务层
//!
//! - [`catalog`] - 模块目录加载
//! - [`RoleStore`] - 角色增删改查 (带校验)
//! - [`PermissionService`] - 权限矩阵、保存与访问判定

pub mod catalog;
pub mod permission;
pub mod role_store;

pub use permission::PermissionService;
pub use role_store::RoleStore;
