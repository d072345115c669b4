//! 消息本地模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 消息记录（由远端存储生成，本地只读）
///
/// 线上格式：`{ "_id": string, "message": string, "createdAt": string }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// 远端分配的唯一 ID，合并时作为主键
    #[serde(rename = "_id", deserialize_with = "crate::im::serialization::deserialize_id")]
    pub id: String,
    /// 消息正文，可能包含作者标记
    #[serde(rename = "message")]
    pub text: String,
    /// 远端时钟的创建时间，唯一排序键
    #[serde(
        rename = "createdAt",
        deserialize_with = "crate::im::serialization::deserialize_timestamp"
    )]
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            created_at,
        }
    }
}

/// 发送消息请求体
#[derive(Debug, Serialize)]
pub struct SubmitMessageReq<'a> {
    pub message: &'a str,
}

/// 消息归属
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    /// 自己发送的
    Mine,
    /// 对方发送的
    Theirs,
}

/// 用于展示的消息（已去除作者标记、已格式化时间）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub id: String,
    pub text: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub time_label: String,
}

impl DisplayMessage {
    pub fn is_mine(&self) -> bool {
        self.author == Author::Mine
    }
}
