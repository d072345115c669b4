//! 消息同步服务层
//!
//! 按固定周期轮询远端全量消息，合并进本地 MessageStore。
//! 每次请求带一个单调递增的序号，较旧的响应永远不会覆盖较新的结果。

use crate::im::error::FetchError;
use crate::im::message::api::RemoteGateway;
use crate::im::message::listener::{EmptyMessageListener, MessageListener};
use crate::im::message::models::MessageRecord;
use crate::im::message::store::MessageStore;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 单次同步的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// 响应已写入缓存
    Applied { changed: bool, count: usize },
    /// 更新的请求已经先完成，本次响应被丢弃
    Stale,
    /// 拉取失败，缓存保持不变
    Failed(FetchError),
    /// 视图已关闭，响应被丢弃
    Discarded,
}

#[derive(Debug, Default)]
struct SyncInner {
    store: MessageStore,
    /// 已写入缓存的最大请求序号
    applied_seq: u64,
    /// 已完成（成功或失败）的最大请求序号
    completed_seq: u64,
    last_fetch_succeeded: bool,
    /// 是否至少成功写入过一次
    loaded: bool,
}

/// 消息同步器
pub struct MessageSyncer {
    gateway: Arc<dyn RemoteGateway>,
    listener: Arc<dyn MessageListener>,
    poll_interval: Duration,
    inner: Mutex<SyncInner>,
    next_seq: AtomicU64,
    in_flight: AtomicUsize,
    closed: AtomicBool,
}

/// 进行中请求计数，drop 时归还（请求被取消也不会卡住）
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn acquire(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MessageSyncer {
    /// 创建新的消息同步器（使用默认空监听器）
    pub fn new(gateway: Arc<dyn RemoteGateway>, poll_interval: Duration) -> Self {
        Self::with_listener(gateway, poll_interval, Arc::new(EmptyMessageListener))
    }

    /// 创建新的消息同步器（带自定义监听器）
    pub fn with_listener(
        gateway: Arc<dyn RemoteGateway>,
        poll_interval: Duration,
        listener: Arc<dyn MessageListener>,
    ) -> Self {
        Self {
            gateway,
            listener,
            poll_interval,
            inner: Mutex::new(SyncInner::default()),
            next_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn listener(&self) -> &Arc<dyn MessageListener> {
        &self.listener
    }

    /// 当前消息视图（快照）
    pub fn current(&self) -> Vec<MessageRecord> {
        self.lock().store.current().to_vec()
    }

    pub fn last_fetch_succeeded(&self) -> bool {
        self.lock().last_fetch_succeeded
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// 首次加载中：有请求在途且从未成功写入过
    pub fn is_initial_loading(&self) -> bool {
        self.is_fetching() && !self.lock().loaded
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 关闭同步器，之后到达的响应全部丢弃
    ///
    /// 持锁置位，保证返回后不会再有响应写入缓存。
    pub fn close(&self) {
        let _inner = self.lock();
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("[MsgSync] 🛑 同步器已关闭");
        }
    }

    /// 执行一次拉取并合并
    ///
    /// 失败不会向上抛出，只体现在返回值和监听器回调里。
    pub async fn sync(&self) -> SyncOutcome {
        if self.is_closed() {
            return SyncOutcome::Discarded;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("[MsgSync] 🔄 发起拉取 seq={}", seq);
        let result = {
            let _guard = InFlightGuard::acquire(&self.in_flight);
            self.gateway.list_messages().await
        };

        match result {
            Ok(records) => {
                let (changed, count, snapshot) = {
                    let mut inner = self.lock();
                    // close() 与写入可能并发，必须在锁内判断
                    if self.is_closed() {
                        debug!("[MsgSync] 视图已关闭，丢弃 seq={} 的响应", seq);
                        return SyncOutcome::Discarded;
                    }
                    if seq > inner.completed_seq {
                        inner.completed_seq = seq;
                        inner.last_fetch_succeeded = true;
                    }
                    if seq < inner.applied_seq {
                        debug!(
                            "[MsgSync] ⏭️ 丢弃过期响应 seq={}（已应用 seq={}）",
                            seq, inner.applied_seq
                        );
                        return SyncOutcome::Stale;
                    }
                    inner.applied_seq = seq;
                    inner.loaded = true;
                    let changed = inner.store.replace(records);
                    let count = inner.store.len();
                    let snapshot = changed.then(|| inner.store.current().to_vec());
                    (changed, count, snapshot)
                };

                debug!(
                    "[MsgSync] ✅ 应用 seq={}，共 {} 条消息，变化: {}",
                    seq, count, changed
                );
                if let Some(messages) = snapshot {
                    if self.is_closed() {
                        debug!("[MsgSync] 视图已关闭，跳过 seq={} 的变更通知", seq);
                        return SyncOutcome::Discarded;
                    }
                    self.listener.on_messages_changed(messages).await;
                }
                SyncOutcome::Applied { changed, count }
            }
            Err(e) => {
                let error = FetchError(e);
                {
                    let mut inner = self.lock();
                    if self.is_closed() {
                        debug!("[MsgSync] 视图已关闭，丢弃 seq={} 的失败结果", seq);
                        return SyncOutcome::Discarded;
                    }
                    if seq > inner.completed_seq {
                        inner.completed_seq = seq;
                        inner.last_fetch_succeeded = false;
                    }
                }
                warn!("[MsgSync] ⚠️ seq={} {}，保留上一次的视图", seq, error);
                self.listener.on_sync_failed(error.to_string()).await;
                SyncOutcome::Failed(error)
            }
        }
    }

    /// 启动周期同步：立即拉取一次，之后按固定周期拉取
    ///
    /// 返回的句柄决定循环的生命周期，句柄被 drop 时循环随之停止。
    pub fn start(self: &Arc<Self>) -> SyncHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let syncer = Arc::clone(self);
        let period = self.poll_interval.max(Duration::from_millis(1));

        info!("[MsgSync] ▶️ 启动周期同步，间隔 {:?}", period);
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = stop_rx.changed() => break,
                            _ = syncer.sync() => {}
                        }
                    }
                }
                if syncer.is_closed() {
                    break;
                }
            }
            info!("[MsgSync] ⏹️ 周期同步已停止");
        });

        SyncHandle {
            syncer: Arc::clone(self),
            stop_tx,
            task: Some(task),
        }
    }
}

/// 周期同步任务句柄
///
/// 由聊天视图持有；`stop` 或 drop 时关闭同步器并结束定时任务。
pub struct SyncHandle {
    syncer: Arc<MessageSyncer>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// 停止同步并等待后台任务退出
    pub async fn stop(mut self) {
        self.syncer.close();
        self.stop_tx.send(true).ok();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("[MsgSync] 同步任务异常退出: {}", e);
                }
            }
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.syncer.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
