use serde_json::Value;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::AppError;
use crate::sync::api::OrderApi;
use crate::sync::pacer::Pacer;
use crate::sync::platform::PlatformProfile;
use crate::sync::transport::PageTransport;
use crate::sync::window::TimeWindow;
use crate::time_util;

/// 单窗口分页拉取的结果。
/// 出错时已拉到的页保留，调用方据此得到部分结果。
#[derive(Debug, Default)]
pub struct WindowFetch {
    pub orders: Vec<Value>,
    pub pages: u32,
    /// 达到安全页数上限仍未出现自然末页
    pub truncated: bool,
    pub error: Option<AppError>,
}

/// 对一个（平台，店铺，状态，窗口）组合跑完整的分页循环。
///
/// 每页都重新构参、重新签名；末页判断优先用平台显式的
/// has_more标记，没有标记时按短页（返回数 < 页大小）判断。
/// 传输、解码或平台业务错误只中止当前窗口。
pub async fn fetch_window(
    api: &dyn OrderApi,
    transport: &dyn PageTransport,
    pacer: &Pacer,
    profile: &PlatformProfile,
    status: &str,
    window: &TimeWindow,
    deadline: Option<Instant>,
) -> WindowFetch {
    let mut fetch = WindowFetch::default();
    let mut natural_end = false;

    for page_no in 1..=profile.max_pages {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                fetch.error = Some(AppError::DeadlineExceeded);
                break;
            }
        }

        pacer.acquire().await;

        let timestamp = time_util::now_epoch_seconds();
        let request = match api.build_page(status, window, page_no, timestamp) {
            Ok(request) => request,
            Err(e) => {
                fetch.error = Some(e);
                break;
            }
        };

        let body = match transport.send(&request).await {
            Ok(body) => body,
            Err(e) => {
                fetch.error = Some(e);
                break;
            }
        };

        let page = match api.extract_page(&body) {
            Ok(page) => page,
            Err(e) => {
                fetch.error = Some(e);
                break;
            }
        };

        fetch.pages += 1;
        let page_len = page.orders.len() as u32;
        fetch.orders.extend(page.orders);
        info!(
            "{} 窗口{} 状态{} 第{}页获取{}条",
            api.platform().as_str(),
            window,
            status,
            page_no,
            page_len,
        );

        // 末页判断：显式标记优先，其次短页
        match page.has_more {
            Some(true) => {}
            Some(false) => {
                natural_end = true;
                break;
            }
            None => {
                if page_len < profile.page_size {
                    natural_end = true;
                    break;
                }
            }
        }
    }

    if fetch.error.is_none() && !natural_end {
        // 拉满上限还没到自然末页，向上报告截断而不是当成功
        fetch.truncated = true;
        warn!(
            "{} 窗口{} 状态{} 达到{}页上限仍未到末页，结果可能不完整",
            api.platform().as_str(),
            window,
            status,
            profile.max_pages,
        );
    }

    fetch
}
