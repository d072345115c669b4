pub mod im;

// 重新导出常用类型和函数，方便外部使用
pub use im::{
    client::{ChatClient, ClientConfig, SyncState},
    error::{FetchError, RemoteError, SendError},
    message::{
        Author, DisplayMessage, MessageListener, MessageRecord, RemoteGateway, SyncHandle,
        SyncOutcome,
    },
};
