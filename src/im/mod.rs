pub mod client;
pub mod error;
pub mod message;
pub mod serialization;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

// 重新导出错误类型
pub use error::{FetchError, RemoteError, SendError};
