use chrono::{NaiveDate, NaiveDateTime, Utc};

/// 各平台接口统一使用的时间格式
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// 解析平台返回的时间字符串，全部按东八区本地时间处理。
/// 解析失败返回None，不回退为当前时间。
pub fn parse_datetime(date_str: &str) -> Option<NaiveDateTime> {
    let s = date_str.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, DATETIME_FMT) {
        return Some(t);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ") {
        return Some(t);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

pub fn format_datetime(t: &NaiveDateTime) -> String {
    t.format(DATETIME_FMT).to_string()
}

/// 把东八区本地时间转换为epoch秒（固定+08:00，无夏令时）
pub fn epoch_seconds_shanghai(t: &NaiveDateTime) -> i64 {
    t.and_utc().timestamp() - 8 * 3600
}

/// epoch秒转东八区本地时间
pub fn epoch_to_shanghai(ts: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp(ts, 0).map(|t| t.naive_utc() + chrono::Duration::hours(8))
}

/// 当前时间戳（epoch秒），作为签名输入传入，签名函数内部不取时钟
pub fn now_epoch_seconds() -> i64 {
    Utc::now().timestamp()
}

/// 当前北京时间
pub fn now_shanghai() -> NaiveDateTime {
    (Utc::now() + chrono::Duration::hours(8)).naive_utc()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        let t = parse_datetime("2025-10-01 08:30:15").unwrap();
        assert_eq!(format_datetime(&t), "2025-10-01 08:30:15");

        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("not a date").is_none());

        let d = parse_datetime("2025-10-01").unwrap();
        assert_eq!(format_datetime(&d), "2025-10-01 00:00:00");
    }

    #[test]
    fn test_epoch_seconds_shanghai() {
        // 1970-01-01 08:00:00 北京时间 == epoch 0
        let t = parse_datetime("1970-01-01 08:00:00").unwrap();
        assert_eq!(epoch_seconds_shanghai(&t), 0);
    }
}
