//! 消息监听器回调接口

use crate::im::message::models::MessageRecord;
use async_trait::async_trait;

/// 消息监听器回调接口
///
/// 只在聊天视图存活期间回调；视图关闭后到达的结果不会通知。
#[async_trait]
pub trait MessageListener: Send + Sync {
    /// 本地消息视图发生变化，参数为排序后的全量消息
    async fn on_messages_changed(&self, messages: Vec<MessageRecord>);

    /// 拉取失败（视图保持上一次成功的结果）
    async fn on_sync_failed(&self, error: String);

    /// 发送失败（不会自动重试）
    async fn on_send_failed(&self, error: String);
}

/// 默认空实现（无操作）
pub struct EmptyMessageListener;

#[async_trait]
impl MessageListener for EmptyMessageListener {
    async fn on_messages_changed(&self, _messages: Vec<MessageRecord>) {}
    async fn on_sync_failed(&self, _error: String) {}
    async fn on_send_failed(&self, _error: String) {}
}
