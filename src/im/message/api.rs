//! 消息 HTTP API 客户端
//!
//! 负责拉取全量消息和提交新消息两个远端操作

use crate::im::error::RemoteError;
use crate::im::message::models::{MessageRecord, SubmitMessageReq};
use crate::im::types::handle_http_response;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 远端消息网关
///
/// `list_messages` 和 `submit_message` 是核心逻辑中仅有的挂起点。
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// 拉取全量消息（无分页、无游标）
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, RemoteError>;

    /// 提交一条消息
    ///
    /// 2xx 且 success 不为 false 即视为已接收；服务器回传的记录解析不了时返回 `None`，
    /// 消息最终通过下一次拉取出现在视图里。
    async fn submit_message(&self, text: &str) -> Result<Option<MessageRecord>, RemoteError>;
}

/// 基于 reqwest 的消息 API 客户端
pub struct MessageApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl MessageApi {
    /// 创建新的消息 API 客户端
    ///
    /// `client` 应该已经在外部配置好超时
    pub fn new(client: reqwest::Client, api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

#[async_trait]
impl RemoteGateway for MessageApi {
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, RemoteError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.url("/api/getMessage");
        debug!("[MsgAPI] 📡 拉取消息 URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .get(&url)
            .header("operationID", &operation_id)
            .send()
            .await?;

        let records = handle_http_response::<Vec<MessageRecord>>(response, "拉取消息")
            .await?
            .into_data()?;
        debug!("[MsgAPI] 📥 拉取到 {} 条消息", records.len());
        Ok(records)
    }

    async fn submit_message(&self, text: &str) -> Result<Option<MessageRecord>, RemoteError> {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.url("/api/message");
        debug!("[MsgAPI] 📤 提交消息 URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&SubmitMessageReq { message: text })
            .send()
            .await?;

        let resp = match handle_http_response::<serde_json::Value>(response, "提交消息").await {
            Ok(resp) => resp,
            Err(RemoteError::Malformed(e)) => {
                // 2xx 即已入库，响应体看不懂也不能让用户重发
                warn!("[MsgAPI] ⚠️ 提交成功但响应无法解析: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if !resp.success {
            return resp.into_data().map(|_| None);
        }

        let record = resp
            .data
            .and_then(|data| serde_json::from_value::<MessageRecord>(data).ok());
        match &record {
            Some(record) => info!("[MsgAPI] ✅ 服务器已接收消息 id={}", record.id),
            None => info!("[MsgAPI] ✅ 服务器已接收消息（未回传可解析的记录）"),
        }
        Ok(record)
    }
}
