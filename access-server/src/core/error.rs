use thiserror::Error;

/// 服务启动和运行期间的错误
///
/// 请求级错误使用 `AppError`；这里只覆盖监听端口和 serve 循环。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
