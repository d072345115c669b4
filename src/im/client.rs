//! 聊天客户端核心实现模块
//!
//! 一个 `ChatClient` 对应一个聊天视图：持有消息缓存、同步器和发送器，
//! 视图关闭时通过 `SyncHandle` 停止轮询。

use crate::im::error::SendError;
use crate::im::message::api::{MessageApi, RemoteGateway};
use crate::im::message::attribution::AttributionResolver;
use crate::im::message::listener::{EmptyMessageListener, MessageListener};
use crate::im::message::models::{DisplayMessage, MessageRecord};
use crate::im::message::sender::MessageSender;
use crate::im::message::service::{MessageSyncer, SyncHandle};
use crate::im::message::view::ViewProjector;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 默认 HTTP API 基础地址
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
/// 默认轮询间隔（毫秒）
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
/// 默认作者标记
pub const DEFAULT_AUTHOR_MARKER: &str = "by Ashok";
/// 默认请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// HTTP API 基础地址
    pub api_base_url: String,
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 作者标记，正文包含该子串的消息视为自己发送
    pub author_marker: String,
    /// 单个 HTTP 请求的超时
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            author_marker: DEFAULT_AUTHOR_MARKER.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 同步状态快照（进程内，不持久化）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    pub last_fetch_succeeded: bool,
    pub is_fetching: bool,
    pub is_sending: bool,
}

/// 聊天客户端
pub struct ChatClient {
    syncer: Arc<MessageSyncer>,
    sender: MessageSender,
    projector: ViewProjector,
}

impl ChatClient {
    /// 创建新的客户端（基于 HTTP 网关，使用默认空监听器）
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_listener(config, Arc::new(EmptyMessageListener))
    }

    /// 创建新的客户端（基于 HTTP 网关，带自定义监听器）
    pub fn with_listener(
        config: ClientConfig,
        listener: Arc<dyn MessageListener>,
    ) -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .timeout(config.request_timeout)
            .build()
            .context("创建 HTTP 客户端失败")?;
        let gateway = Arc::new(MessageApi::new(http_client, config.api_base_url.clone()));
        Ok(Self::with_gateway(config, gateway, listener))
    }

    /// 使用指定网关创建客户端
    pub fn with_gateway(
        config: ClientConfig,
        gateway: Arc<dyn RemoteGateway>,
        listener: Arc<dyn MessageListener>,
    ) -> Self {
        info!(
            "[Client] 创建聊天客户端，API: {}, 轮询间隔: {:?}",
            config.api_base_url, config.poll_interval
        );
        let syncer = Arc::new(MessageSyncer::with_listener(
            gateway.clone(),
            config.poll_interval,
            listener,
        ));
        let sender = MessageSender::new(gateway, syncer.clone());
        let projector = ViewProjector::new(AttributionResolver::new(config.author_marker));
        Self {
            syncer,
            sender,
            projector,
        }
    }

    /// 启动轮询；返回的句柄由视图持有，关闭视图时 stop 或 drop
    pub fn start(&self) -> SyncHandle {
        self.syncer.start()
    }

    /// 原始消息（按时间升序）
    pub fn records(&self) -> Vec<MessageRecord> {
        self.syncer.current()
    }

    /// 用于展示的消息
    pub fn messages(&self) -> Vec<DisplayMessage> {
        self.projector.project(&self.syncer.current())
    }

    pub fn sync_state(&self) -> SyncState {
        SyncState {
            last_fetch_succeeded: self.syncer.last_fetch_succeeded(),
            is_fetching: self.syncer.is_fetching(),
            is_sending: self.sender.is_sending(),
        }
    }

    pub fn is_initial_loading(&self) -> bool {
        self.syncer.is_initial_loading()
    }

    pub fn draft(&self) -> String {
        self.sender.draft()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.sender.set_draft(text)
    }

    pub async fn send(&self, text: &str) -> Result<(), SendError> {
        self.sender.send(text).await
    }

    pub async fn send_draft(&self) -> Result<(), SendError> {
        self.sender.send_draft().await
    }
}
