//! 消息内存缓存
//!
//! 每次成功拉取都整体替换，不做增量更新：远端总是返回全量消息。

use crate::im::message::models::MessageRecord;
use std::collections::HashSet;
use tracing::debug;

/// 本地消息缓存（按 createdAt 升序，ID 唯一）
#[derive(Debug, Default)]
pub struct MessageStore {
    records: Vec<MessageRecord>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用一次拉取结果整体替换缓存
    ///
    /// 同一响应中重复的 ID 只保留第一次出现的记录；排序是稳定的，
    /// 时间相同的记录保持响应中的顺序。返回视图是否发生变化。
    pub fn replace(&mut self, records: Vec<MessageRecord>) -> bool {
        let total = records.len();
        let mut seen = HashSet::with_capacity(total);
        let mut next: Vec<MessageRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        if next.len() != total {
            debug!(
                "[MsgStore] 丢弃重复 ID 的记录 {} 条",
                total - next.len()
            );
        }

        next.sort_by_key(|r| r.created_at);

        if next == self.records {
            return false;
        }
        self.records = next;
        true
    }

    /// 当前视图
    pub fn current(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&MessageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rec(id: &str, secs: i64) -> MessageRecord {
        MessageRecord::new(id, format!("msg {id}"), Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn ids(store: &MessageStore) -> Vec<&str> {
        store.current().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn sorts_ascending_by_created_at() {
        let mut store = MessageStore::new();
        store.replace(vec![rec("c", 30), rec("a", 10), rec("b", 20)]);
        assert_eq!(ids(&store), ["a", "b", "c"]);
    }

    #[test]
    fn equal_timestamps_keep_response_order() {
        let mut store = MessageStore::new();
        store.replace(vec![rec("x", 10), rec("b", 5), rec("y", 10), rec("a", 10)]);
        assert_eq!(ids(&store), ["b", "x", "y", "a"]);

        // 下一次响应顺序不同，以最新响应为准
        store.replace(vec![rec("a", 10), rec("y", 10), rec("x", 10), rec("b", 5)]);
        assert_eq!(ids(&store), ["b", "a", "y", "x"]);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut store = MessageStore::new();
        let mut dup = rec("a", 99);
        dup.text = "later copy".to_string();
        store.replace(vec![rec("a", 10), rec("b", 20), dup]);
        assert_eq!(ids(&store), ["a", "b"]);
        assert_eq!(store.get("a").unwrap().text, "msg a");
    }

    #[test]
    fn overlapping_replaces_never_duplicate() {
        let mut store = MessageStore::new();
        store.replace(vec![rec("a", 10), rec("b", 20)]);
        store.replace(vec![rec("b", 20), rec("c", 30), rec("a", 10)]);
        assert_eq!(ids(&store), ["a", "b", "c"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn replace_reports_changes() {
        let mut store = MessageStore::new();
        assert!(store.is_empty());
        assert!(store.replace(vec![rec("a", 10)]));
        assert!(!store.replace(vec![rec("a", 10)]));
        assert!(store.replace(vec![]));
        assert!(store.is_empty());
    }
}
