use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// 固定间隔的请求闸门。
/// 同平台的分页请求共享一个Pacer，窗口可以并发跑，
/// 但相邻两次请求之间至少间隔interval，节奏策略与分页逻辑解耦。
pub struct Pacer {
    interval: Duration,
    next_at: Mutex<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_at: Mutex::new(Instant::now()),
        }
    }

    /// 占用下一个发送时隙，必要时等待
    pub async fn acquire(&self) {
        let slot = {
            let mut next_at = self.next_at.lock().await;
            let now = Instant::now();
            let slot = if *next_at > now { *next_at } else { now };
            *next_at = slot + self.interval;
            slot
        };
        sleep_until(slot).await;
    }
}
