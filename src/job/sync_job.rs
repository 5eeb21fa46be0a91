use chrono::{Duration, NaiveDateTime, Timelike};
use tracing::info;

use crate::sync::orchestrator::SyncOrchestrator;
use crate::sync::window::TimeWindow;
use crate::time_util;

/// 把时刻向下对齐到半点
pub fn floor_half_hour(t: NaiveDateTime) -> NaiveDateTime {
    let minute = if t.minute() >= 30 { 30 } else { 0 };
    t.date()
        .and_hms_opt(t.hour(), minute, 0)
        .unwrap_or(t)
}

/// 最近一个已完整过去的半小时窗口
pub fn last_completed_half_hour(now: NaiveDateTime) -> TimeWindow {
    let end = floor_half_hour(now);
    TimeWindow::new(end - Duration::minutes(30), end)
}

/// 启动补拉窗口：当天零点到最近的半点。
/// 刚过零点时没有完整的半小时，返回None。
pub fn catch_up_window(now: NaiveDateTime) -> Option<TimeWindow> {
    let midnight = now.date().and_hms_opt(0, 0, 0)?;
    let end = floor_half_hour(now);
    if end <= midnight {
        return None;
    }
    Some(TimeWindow::new(midnight, end))
}

/// 常驻的半小时定时同步。
/// 启动时先补拉当天已过去的部分，之后每个半点醒来
/// 同步刚结束的半小时窗口。
pub async fn run_forever(orchestrator: &SyncOrchestrator) {
    if let Some(window) = catch_up_window(time_util::now_shanghai()) {
        info!("启动补拉窗口{}", window);
        orchestrator.run(&window).await;
    }

    loop {
        let now = time_util::now_shanghai();
        let next = floor_half_hour(now) + Duration::minutes(30);
        let wait = (next - now).to_std().unwrap_or_default();
        info!("下一轮同步时间 {}", time_util::format_datetime(&next));
        tokio::time::sleep(wait).await;

        let window = TimeWindow::new(next - Duration::minutes(30), next);
        orchestrator.run(&window).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::time_util::parse_datetime;

    #[test]
    fn test_floor_half_hour() {
        let t = parse_datetime("2025-10-01 14:47:13").unwrap();
        assert_eq!(floor_half_hour(t), parse_datetime("2025-10-01 14:30:00").unwrap());
        let t = parse_datetime("2025-10-01 14:12:00").unwrap();
        assert_eq!(floor_half_hour(t), parse_datetime("2025-10-01 14:00:00").unwrap());
        let t = parse_datetime("2025-10-01 14:30:00").unwrap();
        assert_eq!(floor_half_hour(t), t);
    }

    #[test]
    fn test_last_completed_half_hour() {
        let now = parse_datetime("2025-10-01 09:05:00").unwrap();
        let w = last_completed_half_hour(now);
        assert_eq!(w.start, parse_datetime("2025-10-01 08:30:00").unwrap());
        assert_eq!(w.end, parse_datetime("2025-10-01 09:00:00").unwrap());
    }

    #[test]
    fn test_catch_up_window() {
        let now = parse_datetime("2025-10-01 09:05:00").unwrap();
        let w = catch_up_window(now).unwrap();
        assert_eq!(w.start, parse_datetime("2025-10-01 00:00:00").unwrap());
        assert_eq!(w.end, parse_datetime("2025-10-01 09:00:00").unwrap());

        // 刚过零点没有完整半小时
        let now = parse_datetime("2025-10-01 00:10:00").unwrap();
        assert!(catch_up_window(now).is_none());
    }
}
