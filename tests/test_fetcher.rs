use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use order_sync::error::AppError;
use order_sync::sync::api::OrderApi;
use order_sync::sync::fetcher::fetch_window;
use order_sync::sync::model::RawPage;
use order_sync::sync::normalize::coerce_list;
use order_sync::sync::pacer::Pacer;
use order_sync::sync::platform::{Platform, PlatformProfile};
use order_sync::sync::transport::{PageRequest, PageTransport};
use order_sync::sync::window::TimeWindow;
use order_sync::time_util::parse_datetime;

/// 把页码编进URL的脚本接口，响应体就是页JSON
struct ScriptedApi;

impl OrderApi for ScriptedApi {
    fn platform(&self) -> Platform {
        Platform::Jushuitan
    }

    fn build_page(
        &self,
        _status: &str,
        _window: &TimeWindow,
        page_no: u32,
        _timestamp: i64,
    ) -> Result<PageRequest, AppError> {
        Ok(PageRequest::Form {
            url: format!("http://scripted/page/{}", page_no),
            fields: vec![],
        })
    }

    fn extract_page(&self, body: &str) -> Result<RawPage, AppError> {
        let value: Value = serde_json::from_str(body)?;
        if value.get("fail").is_some() {
            return Err(AppError::PlatformBusiness("脚本页故障".to_string()));
        }
        Ok(RawPage {
            orders: coerce_list(&value["orders"]),
            has_more: value.get("has_more").and_then(Value::as_bool),
        })
    }
}

/// 按页码返回预置响应体
struct ScriptedTransport {
    pages: Vec<String>,
}

#[async_trait]
impl PageTransport for ScriptedTransport {
    async fn send(&self, request: &PageRequest) -> Result<String, AppError> {
        let page_no: usize = request
            .url()
            .rsplit('/')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        self.pages
            .get(page_no - 1)
            .cloned()
            .ok_or_else(|| AppError::Transport("脚本页不存在".to_string()))
    }
}

fn orders_page(count: usize) -> String {
    let orders: Vec<Value> = (0..count).map(|i| json!({"so_id": format!("S{}", i)})).collect();
    json!({ "orders": orders }).to_string()
}

fn profile(max_pages: u32) -> PlatformProfile {
    let mut profile = PlatformProfile::defaults(Platform::Jushuitan);
    profile.page_size = 100;
    profile.max_pages = max_pages;
    profile.pace = Duration::ZERO;
    profile
}

fn day_window() -> TimeWindow {
    TimeWindow::new(
        parse_datetime("2025-10-01 00:00:00").unwrap(),
        parse_datetime("2025-10-02 00:00:00").unwrap(),
    )
}

#[tokio::test]
async fn test_short_page_ends_loop() {
    let transport = ScriptedTransport {
        pages: vec![orders_page(100), orders_page(37)],
    };
    let pacer = Pacer::new(Duration::ZERO);
    let fetch = fetch_window(
        &ScriptedApi,
        &transport,
        &pacer,
        &profile(100),
        "WaitConfirm",
        &day_window(),
        None,
    )
    .await;

    assert_eq!(fetch.orders.len(), 137);
    assert_eq!(fetch.pages, 2);
    assert!(!fetch.truncated);
    assert!(fetch.error.is_none());
}

#[tokio::test]
async fn test_page_cap_reports_truncation() {
    let transport = ScriptedTransport {
        pages: vec![orders_page(100), orders_page(100), orders_page(100)],
    };
    let pacer = Pacer::new(Duration::ZERO);
    let fetch = fetch_window(
        &ScriptedApi,
        &transport,
        &pacer,
        &profile(2),
        "WaitConfirm",
        &day_window(),
        None,
    )
    .await;

    assert_eq!(fetch.pages, 2);
    assert_eq!(fetch.orders.len(), 200);
    assert!(fetch.truncated);
    assert!(fetch.error.is_none());
}

#[tokio::test]
async fn test_explicit_has_more_false_beats_full_page() {
    // 整页但显式标记没有下一页
    let page = json!({
        "orders": (0..100).map(|i| json!({"so_id": i})).collect::<Vec<_>>(),
        "has_more": false,
    })
    .to_string();
    let transport = ScriptedTransport { pages: vec![page] };
    let pacer = Pacer::new(Duration::ZERO);
    let fetch = fetch_window(
        &ScriptedApi,
        &transport,
        &pacer,
        &profile(100),
        "WaitConfirm",
        &day_window(),
        None,
    )
    .await;

    assert_eq!(fetch.pages, 1);
    assert!(!fetch.truncated);
}

#[tokio::test]
async fn test_mid_window_error_keeps_partial_result() {
    let transport = ScriptedTransport {
        pages: vec![orders_page(100), json!({"fail": true}).to_string()],
    };
    let pacer = Pacer::new(Duration::ZERO);
    let fetch = fetch_window(
        &ScriptedApi,
        &transport,
        &pacer,
        &profile(100),
        "WaitConfirm",
        &day_window(),
        None,
    )
    .await;

    // 第一页保留，错误上报，不算截断
    assert_eq!(fetch.orders.len(), 100);
    assert!(matches!(fetch.error, Some(AppError::PlatformBusiness(_))));
    assert!(!fetch.truncated);
}

#[tokio::test]
async fn test_expired_deadline_stops_before_first_page() {
    let transport = ScriptedTransport {
        pages: vec![orders_page(100)],
    };
    let pacer = Pacer::new(Duration::ZERO);
    let fetch = fetch_window(
        &ScriptedApi,
        &transport,
        &pacer,
        &profile(100),
        "WaitConfirm",
        &day_window(),
        Some(Instant::now()),
    )
    .await;

    assert_eq!(fetch.pages, 0);
    assert!(fetch.orders.is_empty());
    assert!(matches!(fetch.error, Some(AppError::DeadlineExceeded)));
}
