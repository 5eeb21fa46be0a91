use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::sync::model::{CanonicalOrderLine, SyncResult};

/// 一批规范订单行落库的统计
#[derive(Debug, Clone, Copy, Default)]
pub struct SinkReport {
    pub inserted: u64,
    pub duplicates: u64,
}

/// 规范订单行的写入端。
/// 同一行可能被不同窗口重复拉到，写入端负责幂等去重。
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn store(&self, lines: &[CanonicalOrderLine]) -> anyhow::Result<SinkReport>;
}

/// 每店铺同步结束后的结果通知
#[async_trait]
pub trait SyncNotifier: Send + Sync {
    async fn notify(&self, shop_name: &str, result: &SyncResult) -> anyhow::Result<()>;
}

/// 追加写JSON Lines文件的写入端，按（订单号，子订单号，SKU）去重
pub struct JsonlSink {
    path: PathBuf,
    seen: Mutex<HashSet<String>>,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seen: Mutex::new(HashSet::new()),
        }
    }

    fn dedup_key(line: &CanonicalOrderLine) -> String {
        format!(
            "{}|{}|{}|{}",
            line.platform, line.order_no, line.sub_order_no, line.sku_id
        )
    }
}

#[async_trait]
impl OrderSink for JsonlSink {
    async fn store(&self, lines: &[CanonicalOrderLine]) -> anyhow::Result<SinkReport> {
        let mut report = SinkReport::default();
        if lines.is_empty() {
            return Ok(report);
        }

        let mut buf = Vec::new();
        {
            let mut seen = self.seen.lock().await;
            for line in lines {
                if !seen.insert(Self::dedup_key(line)) {
                    report.duplicates += 1;
                    continue;
                }
                serde_json::to_writer(&mut buf, line)?;
                buf.push(b'\n');
                report.inserted += 1;
            }
        }

        if !buf.is_empty() {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(&buf).await?;
            file.flush().await?;
        }
        Ok(report)
    }
}

/// 只打日志的通知端，没配钉钉时使用
pub struct LogNotifier;

#[async_trait]
impl SyncNotifier for LogNotifier {
    async fn notify(&self, shop_name: &str, result: &SyncResult) -> anyhow::Result<()> {
        info!(
            "{} 同步完成: 原始{}条 过滤{}条 规范{}条 插入{}条 重复{}条 截断窗口{} 错误{}个",
            shop_name,
            result.raw_count,
            result.filtered_count,
            result.canonical_count,
            result.inserted,
            result.duplicates,
            result.truncated_windows,
            result.window_errors.len(),
        );
        Ok(())
    }
}
