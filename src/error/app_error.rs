use thiserror::Error;

/// 应用错误
///
/// 同步过程中的错误只会中止当前时间窗口的分页循环，
/// 不影响其他窗口和其他店铺。
#[derive(Error, Debug)]
pub enum AppError {
    /// 网络/HTTP层错误
    #[error("网络请求失败: {0}")]
    Transport(String),

    /// 响应不是JSON或结构不匹配
    #[error("响应解析失败: {0}")]
    Decode(String),

    /// 平台返回的业务错误（error_response / success=false 等）
    #[error("平台业务错误: {0}")]
    PlatformBusiness(String),

    /// 签名输入无法编码
    #[error("签名参数编码失败: {0}")]
    Encoding(String),

    /// 调用方给定的截止时间已到
    #[error("同步截止时间已到")]
    DeadlineExceeded,
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}
