use chrono::{Duration, NaiveDateTime};

use crate::time_util;

/// 半开时间窗口 [start, end)。
/// 边界时刻恰好落在一个窗口里，切分不丢不重。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn start_str(&self) -> String {
        time_util::format_datetime(&self.start)
    }

    /// 闭区间结束时间。多数平台接口按闭区间理解end参数，
    /// 传end-1秒保证相邻窗口不重复拉取边界秒。
    pub fn end_inclusive_str(&self) -> String {
        time_util::format_datetime(&(self.end - Duration::seconds(1)))
    }

    pub fn start_epoch(&self) -> i64 {
        time_util::epoch_seconds_shanghai(&self.start)
    }

    pub fn end_inclusive_epoch(&self) -> i64 {
        time_util::epoch_seconds_shanghai(&self.end) - 1
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} ~ {})", self.start_str(), time_util::format_datetime(&self.end))
    }
}

/// 按给定的小时边界把查询区间预切分成子窗口，
/// 用于规避平台的页数上限。边界为空时原样返回单个窗口。
pub fn split_by_hours(window: &TimeWindow, boundaries: &[u32]) -> Vec<TimeWindow> {
    if boundaries.is_empty() || window.start >= window.end {
        return vec![window.clone()];
    }

    // 收集区间内部的切分点
    let mut cuts: Vec<NaiveDateTime> = Vec::new();
    let mut day = window.start.date();
    let last_day = window.end.date();
    while day <= last_day {
        for &hour in boundaries {
            if let Some(t) = day.and_hms_opt(hour, 0, 0) {
                if t > window.start && t < window.end {
                    cuts.push(t);
                }
            }
        }
        day += Duration::days(1);
    }
    cuts.sort();
    cuts.dedup();

    let mut windows = Vec::with_capacity(cuts.len() + 1);
    let mut start = window.start;
    for cut in cuts {
        windows.push(TimeWindow::new(start, cut));
        start = cut;
    }
    windows.push(TimeWindow::new(start, window.end));
    windows
}
