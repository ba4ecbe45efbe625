use chrono::DateTime;

pub fn now() -> i64 {
    let now = chrono::Local::now();
    now.timestamp()
}

/// 时间戳转展示字符串。超出 chrono 可表示范围的值原样展示，不中断调用方
pub fn time_to_str(time: i64) -> String {
    match DateTime::from_timestamp(time, 0) {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => time.to_string(),
    }
}
