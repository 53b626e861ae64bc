//! 通用工具函数

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 列表字段的存储分隔符
pub const LIST_SEPARATOR: &str = ", ";

/// 将逗号分隔的字符串拆成列表，去除首尾空白并丢弃空项
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// `split_list` 的逆操作
pub fn join_list(items: &[String]) -> String {
    items.join(LIST_SEPARATOR)
}

/// 解析时间戳，接受 RFC 3339、无时区的 ISO 时间以及纯日期
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 格式化为存储使用的 RFC 3339 字符串
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
