//! 展示层投影：归属判断 + 时间格式化
//!
//! 顺序沿用 MessageStore 的顺序，这里不重新排序。

use crate::im::message::attribution::AttributionResolver;
use crate::im::message::models::{DisplayMessage, MessageRecord};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

/// 格式化为 `hh:mm AM/PM`（12 小时制，两位小时和分钟）
pub fn format_time<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format("%I:%M %p").to_string()
}

#[derive(Debug, Clone)]
pub struct ViewProjector {
    resolver: AttributionResolver,
}

impl ViewProjector {
    pub fn new(resolver: AttributionResolver) -> Self {
        Self { resolver }
    }

    /// 使用本地时区投影
    pub fn project(&self, records: &[MessageRecord]) -> Vec<DisplayMessage> {
        self.project_in(records, &Local)
    }

    pub fn project_in<Tz>(&self, records: &[MessageRecord], tz: &Tz) -> Vec<DisplayMessage>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        records
            .iter()
            .map(|r| {
                let (author, text) = self.resolver.resolve(&r.text);
                DisplayMessage {
                    id: r.id.clone(),
                    text: text.into_owned(),
                    author,
                    created_at: r.created_at,
                    time_label: format_time(&r.created_at, tz),
                }
            })
            .collect()
    }
}
