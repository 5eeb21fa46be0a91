use serde_json::{json, Value};

use crate::error::AppError;
use crate::sync::api::OrderApi;
use crate::sync::model::{Credential, RawPage, ShopConfig};
use crate::sync::normalize::coerce_list;
use crate::sync::platform::{Platform, PlatformProfile};
use crate::sync::transport::PageRequest;
use crate::sync::window::TimeWindow;

/// 有赞云订单查询。
/// 不走参数签名，access_token直接挂在URL上；
/// 响应带显式的has_next翻页标记，缺失时退回短页判断。
pub struct YouzanApi {
    endpoint: String,
    credential: Credential,
    page_size: u32,
}

impl YouzanApi {
    pub fn new(shop: &ShopConfig, profile: &PlatformProfile) -> Self {
        Self {
            endpoint: profile.endpoint.clone(),
            credential: shop.credential.clone(),
            page_size: profile.page_size,
        }
    }
}

impl OrderApi for YouzanApi {
    fn platform(&self) -> Platform {
        Platform::Youzan
    }

    fn build_page(
        &self,
        status: &str,
        window: &TimeWindow,
        page_no: u32,
        _timestamp: i64,
    ) -> Result<PageRequest, AppError> {
        let url = format!("{}?access_token={}", self.endpoint, self.credential.access_token);
        let body = json!({
            "page_no": page_no.to_string(),
            "page_size": self.page_size.to_string(),
            "start_created": window.start_str(),
            "end_created": window.end_inclusive_str(),
            "status": status,
        });
        Ok(PageRequest::Json { url, body })
    }

    fn extract_page(&self, body: &str) -> Result<RawPage, AppError> {
        let value: Value = serde_json::from_str(body)?;

        let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
        if !success {
            let msg = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("未知错误");
            return Err(AppError::PlatformBusiness(format!("有赞: {}", msg)));
        }

        let data = &value["data"];
        let orders = coerce_list(&data["full_order_info_list"]);
        let has_more = data.get("has_next").and_then(Value::as_bool);
        Ok(RawPage { orders, has_more })
    }
}
