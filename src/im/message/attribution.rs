//! 消息归属判断
//!
//! 数据模型里没有发送者字段，只能看正文里是否带有固定的作者标记。
//! 任何包含标记的消息都会被当成自己发的，即使是别人输入的。

use crate::im::message::models::Author;
use std::borrow::Cow;

/// 基于作者标记的归属判断
#[derive(Debug, Clone)]
pub struct AttributionResolver {
    marker: String,
}

impl AttributionResolver {
    /// 空标记表示关闭归属判断，所有消息都视为对方发送
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// 判断归属，并返回用于展示的正文
    ///
    /// 命中时只去掉第一次出现的标记，再去掉首尾空白；未命中时原样返回。
    pub fn resolve<'a>(&self, text: &'a str) -> (Author, Cow<'a, str>) {
        if self.marker.is_empty() || !text.contains(self.marker.as_str()) {
            return (Author::Theirs, Cow::Borrowed(text));
        }
        let stripped = text.replacen(self.marker.as_str(), "", 1);
        (Author::Mine, Cow::Owned(stripped.trim().to_string()))
    }

    pub fn author_of(&self, text: &str) -> Author {
        self.resolve(text).0
    }
}
