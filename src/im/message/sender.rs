//! 消息发送控制
//!
//! 同一时间最多一条消息在途；发送成功后不做本地回显，
//! 而是立即补一次拉取，消息经由远端回到本地视图。

use crate::im::error::SendError;
use crate::im::message::api::RemoteGateway;
use crate::im::message::service::{MessageSyncer, SyncOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// 发送中标记，drop 时释放
struct SendingGuard<'a>(&'a AtomicBool);

impl<'a> SendingGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 消息发送器
pub struct MessageSender {
    gateway: Arc<dyn RemoteGateway>,
    syncer: Arc<MessageSyncer>,
    sending: AtomicBool,
    /// 待发送的输入内容
    draft: Mutex<String>,
}

impl MessageSender {
    pub fn new(gateway: Arc<dyn RemoteGateway>, syncer: Arc<MessageSyncer>) -> Self {
        Self {
            gateway,
            syncer,
            sending: AtomicBool::new(false),
            draft: Mutex::new(String::new()),
        }
    }

    fn draft_lock(&self) -> MutexGuard<'_, String> {
        self.draft.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    pub fn draft(&self) -> String {
        self.draft_lock().clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *self.draft_lock() = text.into();
    }

    /// 发送当前输入内容
    pub async fn send_draft(&self) -> Result<(), SendError> {
        let text = self.draft();
        self.send(&text).await
    }

    /// 发送一条消息
    ///
    /// - 去掉首尾空白后为空：不发请求，返回 `EmptyMessage`
    /// - 已有消息在途：直接忽略，返回 `AlreadySending`
    /// - 成功：清空输入内容，并在释放在途标记前补拉一次
    /// - 失败：保留输入内容，不自动重试
    pub async fn send(&self, text: &str) -> Result<(), SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if self.syncer.is_closed() {
            return Err(SendError::Closed);
        }
        let Some(_guard) = SendingGuard::try_acquire(&self.sending) else {
            debug!("[MsgSend] 上一条消息仍在发送中，忽略本次发送");
            return Err(SendError::AlreadySending);
        };

        debug!("[MsgSend] 📤 发送消息，长度 {}", text.len());
        let result = self.gateway.submit_message(text).await;

        if self.syncer.is_closed() {
            debug!("[MsgSend] 视图已关闭，丢弃发送结果");
            return Ok(());
        }

        match result {
            Ok(record) => {
                match record {
                    Some(record) => info!("[MsgSend] ✅ 消息已发送 id={}", record.id),
                    None => info!("[MsgSend] ✅ 消息已发送"),
                }
                self.draft_lock().clear();
                if let SyncOutcome::Failed(e) = self.syncer.sync().await {
                    warn!("[MsgSend] 发送后补拉失败，等待下一次轮询: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                let error = SendError::from(e);
                warn!("[MsgSend] ❌ {}", error);
                self.syncer
                    .listener()
                    .on_send_failed(error.to_string())
                    .await;
                Err(error)
            }
        }
    }
}
