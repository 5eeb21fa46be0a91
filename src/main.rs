use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;

use order_sync::app_config::env::load_shops;
use order_sync::app_config::log::setup_logging;
use order_sync::job::sync_job;
use order_sync::notify::DingTalkNotifier;
use order_sync::sync::orchestrator::SyncOrchestrator;
use order_sync::sync::sink::{JsonlSink, LogNotifier, SyncNotifier};
use order_sync::sync::transport::HttpTransport;
use order_sync::sync::window::TimeWindow;
use order_sync::time_util;

/// 多平台订单同步
#[derive(Parser, Debug)]
#[command(name = "order_sync")]
struct Args {
    /// 同步区间起点，格式 YYYY-MM-DD HH:MM:SS，缺省为昨天零点
    #[arg(long)]
    start: Option<String>,

    /// 同步区间终点（不含），缺省为今天零点
    #[arg(long)]
    end: Option<String>,

    /// 常驻模式：每半小时同步一次，启动时补拉当天
    #[arg(long)]
    schedule: bool,

    /// 店铺配置文件
    #[arg(long, default_value = "shops.json")]
    shops: String,

    /// 规范订单行输出文件
    #[arg(long, default_value = "orders.jsonl")]
    out: String,

    /// 店铺并发数
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
}

fn default_window() -> TimeWindow {
    let today = time_util::now_shanghai()
        .date()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| time_util::now_shanghai());
    TimeWindow::new(today - Duration::days(1), today)
}

fn parse_window(args: &Args) -> anyhow::Result<TimeWindow> {
    let window = match (&args.start, &args.end) {
        (Some(start), Some(end)) => {
            let start = time_util::parse_datetime(start)
                .ok_or_else(|| anyhow::anyhow!("无法解析起点时间: {}", start))?;
            let end = time_util::parse_datetime(end)
                .ok_or_else(|| anyhow::anyhow!("无法解析终点时间: {}", end))?;
            if start >= end {
                anyhow::bail!("起点必须早于终点");
            }
            TimeWindow::new(start, end)
        }
        (None, None) => default_window(),
        _ => anyhow::bail!("--start和--end必须同时给出"),
    };
    Ok(window)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    setup_logging().await?;

    let args = Args::parse();
    let shops = load_shops(&args.shops)?;
    info!("加载{}家店铺配置", shops.len());

    let notifier: Arc<dyn SyncNotifier> = match DingTalkNotifier::from_env() {
        Some(dingtalk) => Arc::new(dingtalk),
        None => {
            info!("未配置钉钉webhook，结果只写日志");
            Arc::new(LogNotifier)
        }
    };

    let orchestrator = SyncOrchestrator::new(
        shops,
        Arc::new(HttpTransport::new()),
        Arc::new(JsonlSink::new(&args.out)),
        notifier,
    )
    .with_concurrency(args.concurrency);

    if args.schedule {
        tokio::select! {
            _ = sync_job::run_forever(&orchestrator) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("收到退出信号，停止定时同步");
            }
        }
        return Ok(());
    }

    let window = parse_window(&args)?;
    let results = orchestrator.run(&window).await;
    for (shop_name, result) in &results {
        info!(
            "{}: 原始{}条 规范{}条 插入{}条 完整={}",
            shop_name,
            result.raw_count,
            result.canonical_count,
            result.inserted,
            result.complete(),
        );
    }
    Ok(())
}
