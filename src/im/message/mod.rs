//! 消息模块
//!
//! 实现消息的轮询同步、发送、归属判断和展示投影

pub mod api;
pub mod attribution;
pub mod listener;
pub mod models;
pub mod sender;
pub mod service;
pub mod store;
pub mod view;

// 重新导出主要类型和函数
pub use api::{MessageApi, RemoteGateway};
pub use attribution::AttributionResolver;
pub use listener::{EmptyMessageListener, MessageListener};
pub use models::{Author, DisplayMessage, MessageRecord};
pub use sender::MessageSender;
pub use service::{MessageSyncer, SyncHandle, SyncOutcome};
pub use store::MessageStore;
pub use view::{format_time, ViewProjector};
