//! 错误类型定义
//!
//! 所有错误都在本地恢复：拉取失败保留上一次的视图，发送失败交还给调用方。

use thiserror::Error;

/// 远端网关错误（HTTP 传输、状态码、业务失败、响应格式）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// 网络/传输层错误
    #[error("网络错误: {0}")]
    Transport(String),

    /// 请求超时
    #[error("请求超时")]
    Timeout,

    /// 非 2xx 状态码
    #[error("HTTP 错误 {status}: {body}")]
    Status { status: u16, body: String },

    /// 服务器返回 success=false
    #[error("服务器拒绝请求: {0}")]
    Rejected(String),

    /// 响应无法解析
    #[error("响应格式错误: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

/// 拉取消息失败（由同步循环吸收，不会向上抛出）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("拉取消息失败: {0}")]
pub struct FetchError(#[from] pub RemoteError);

/// 发送消息失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// 去掉首尾空白后为空
    #[error("消息内容为空")]
    EmptyMessage,

    /// 上一条消息仍在发送中，本次调用被忽略
    #[error("上一条消息仍在发送中")]
    AlreadySending,

    /// 聊天视图已关闭
    #[error("聊天视图已关闭")]
    Closed,

    #[error("发送消息失败: {0}")]
    Remote(#[from] RemoteError),
}
