use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

/// 消息 ID 反序列化函数（兼容字符串和整数）
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Str(s) => Ok(s),
        RawId::Int(n) => Ok(n.to_string()),
    }
}

/// 时间戳反序列化函数
///
/// 支持 ISO-8601 字符串、`YYYY-MM-DD HH:MM:SS` 以及毫秒级 Unix 时间戳（数字或数字字符串）。
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Str(String),
        Millis(i64),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Str(s) => parse_timestamp(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("无法解析的时间戳: {s}"))),
        RawTimestamp::Millis(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| serde::de::Error::custom(format!("时间戳超出范围: {ms}"))),
    }
}

/// 解析时间戳字符串，无时区信息的按 UTC 处理
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Date.toString / toUTCString 风格，例如 "Thu, 09 Oct 2025 10:00:00 GMT"
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    s.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_iso_with_zulu_and_offset() {
        let a = parse_timestamp("2025-01-02T03:04:05.678Z").unwrap();
        let b = parse_timestamp("2025-01-02T11:04:05.678+08:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hour(), 3);
    }

    #[test]
    fn naive_values_are_utc() {
        let a = parse_timestamp("2025-01-02T03:04:05").unwrap();
        let b = parse_timestamp("2025-01-02 03:04:05").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_rfc3339(), "2025-01-02T03:04:05+00:00");
    }

    #[test]
    fn parses_rfc2822() {
        let a = parse_timestamp("Thu, 09 Oct 2025 10:00:00 GMT").unwrap();
        let b = parse_timestamp("Thu, 09 Oct 2025 12:00:00 +0200").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_rfc3339(), "2025-10-09T10:00:00+00:00");
    }

    #[test]
    fn epoch_millis_string() {
        let a = parse_timestamp("1700000000000").unwrap();
        assert_eq!(a.timestamp(), 1_700_000_000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
