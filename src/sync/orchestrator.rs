use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{error, info};

use crate::sync::api::make_api;
use crate::sync::fetcher::fetch_window;
use crate::sync::model::{ShopConfig, SyncResult};
use crate::sync::normalize::category::{CategoryResolver, TaobaoCategorySource};
use crate::sync::normalize::normalize_batch;
use crate::sync::pacer::Pacer;
use crate::sync::platform::{Platform, PlatformProfile};
use crate::sync::sink::{OrderSink, SyncNotifier};
use crate::sync::transport::PageTransport;
use crate::sync::window::{split_by_hours, TimeWindow};

/// 多店铺同步的编排入口。
///
/// 店铺之间按有限并发推进；单个店铺内部先把区间按平台配置
/// 切成子窗口，每个（状态，子窗口）各跑一轮分页，再统一
/// 规范化、落库、通知。任何一步失败都只影响当前店铺的统计，
/// 不会让整次同步中止。
pub struct SyncOrchestrator {
    shops: Vec<ShopConfig>,
    transport: Arc<dyn PageTransport>,
    sink: Arc<dyn OrderSink>,
    notifier: Arc<dyn SyncNotifier>,
    profiles: HashMap<Platform, PlatformProfile>,
    concurrency: usize,
    deadline: Option<Instant>,
}

impl SyncOrchestrator {
    pub fn new(
        shops: Vec<ShopConfig>,
        transport: Arc<dyn PageTransport>,
        sink: Arc<dyn OrderSink>,
        notifier: Arc<dyn SyncNotifier>,
    ) -> Self {
        Self {
            shops,
            transport,
            sink,
            notifier,
            profiles: HashMap::new(),
            concurrency: 4,
            deadline: None,
        }
    }

    /// 覆盖某平台的缺省拉取配置
    pub fn with_profile(mut self, platform: Platform, profile: PlatformProfile) -> Self {
        self.profiles.insert(platform, profile);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// 整次同步的截止时间，超时后未开始的页不再发起
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn profile_for(&self, platform: Platform) -> PlatformProfile {
        self.profiles
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| PlatformProfile::defaults(platform))
    }

    /// 同步所有店铺在给定区间内的订单，返回每店铺的统计
    pub async fn run(&self, window: &TimeWindow) -> Vec<(String, SyncResult)> {
        info!("开始同步 {} 家店铺，区间{}", self.shops.len(), window);

        futures::stream::iter(self.shops.iter())
            .map(|shop| async move {
                let result = self.run_shop(shop, window).await;
                (shop.shop_name.clone(), result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    async fn run_shop(&self, shop: &ShopConfig, window: &TimeWindow) -> SyncResult {
        let profile = self.profile_for(shop.platform);
        let api = make_api(shop, &profile);
        let pacer = Pacer::new(profile.pace);
        let windows = split_by_hours(window, &profile.window_boundaries);

        let mut result = SyncResult::default();

        // 同店铺的（状态，子窗口）组合并发拉取，节奏由共享Pacer约束
        let fetches = {
            let mut futs = Vec::new();
            for status in &profile.statuses {
                for sub in &windows {
                    futs.push(fetch_window(
                        api.as_ref(),
                        self.transport.as_ref(),
                        &pacer,
                        &profile,
                        status,
                        sub,
                        self.deadline,
                    ));
                }
            }
            join_all(futs).await
        };

        let mut raw_orders = Vec::new();
        for fetch in fetches {
            result.raw_count += fetch.orders.len() as u64;
            if fetch.truncated {
                result.truncated_windows += 1;
            }
            if let Some(e) = fetch.error {
                result.window_errors.push(e.to_string());
            }
            raw_orders.extend(fetch.orders);
        }

        let output = normalize_batch(shop.platform, &raw_orders, shop);
        result.filtered_count = output.filtered;
        result.max_ts = output.max_ts;
        let mut lines = output.lines;
        result.canonical_count = lines.len() as u64;

        // 淘宝的类目名按CID批量回填，查询失败只留占位名
        if shop.platform == Platform::Taobao && lines.iter().any(|l| l.cid.is_some()) {
            let source = TaobaoCategorySource::new(
                self.transport.as_ref(),
                shop.credential.clone(),
                profile.endpoint.clone(),
            );
            let mut resolver = CategoryResolver::new(&source);
            resolver.fill(&mut lines).await;
        }

        match self.sink.store(&lines).await {
            Ok(report) => {
                result.inserted = report.inserted;
                result.duplicates = report.duplicates;
            }
            Err(e) => {
                error!("{} 订单落库失败: {}", shop.shop_name, e);
                result.window_errors.push(format!("落库失败: {}", e));
            }
        }

        if let Err(e) = self.notifier.notify(&shop.shop_name, &result).await {
            // 通知失败不计入同步错误
            error!("{} 结果通知失败: {}", shop.shop_name, e);
        }

        info!(
            "{} 同步结束: 原始{}条 规范{}条 插入{}条 截断{} 错误{}",
            shop.shop_name,
            result.raw_count,
            result.canonical_count,
            result.inserted,
            result.truncated_windows,
            result.window_errors.len(),
        );
        result
    }
}
