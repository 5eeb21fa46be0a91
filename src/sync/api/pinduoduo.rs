use serde_json::Value;

use crate::error::AppError;
use crate::sync::api::OrderApi;
use crate::sync::model::{Credential, RawPage, RequestParams, ShopConfig};
use crate::sync::normalize::coerce_list;
use crate::sync::platform::{Platform, PlatformProfile};
use crate::sync::sign::{sign, HexCase, SecretWrap, SignAlgorithm};
use crate::sync::transport::PageRequest;
use crate::sync::window::TimeWindow;

/// 拼多多开放平台网关。
/// 签名约定：密钥前后包裹，MD5大写；时间参数为epoch秒。
pub struct PinduoduoApi {
    endpoint: String,
    credential: Credential,
    page_size: u32,
}

impl PinduoduoApi {
    pub fn new(shop: &ShopConfig, profile: &PlatformProfile) -> Self {
        Self {
            endpoint: profile.endpoint.clone(),
            credential: shop.credential.clone(),
            page_size: profile.page_size,
        }
    }
}

impl OrderApi for PinduoduoApi {
    fn platform(&self) -> Platform {
        Platform::Pinduoduo
    }

    fn build_page(
        &self,
        status: &str,
        window: &TimeWindow,
        page_no: u32,
        timestamp: i64,
    ) -> Result<PageRequest, AppError> {
        let params = RequestParams::new()
            .with("type", "pdd.order.list.get")
            .with("timestamp", timestamp.to_string())
            .with("client_id", self.credential.app_key.clone())
            .with("data_type", "json")
            .with("access_token", self.credential.access_token.clone())
            .with("page", page_no.to_string())
            .with("page_size", self.page_size.to_string())
            .with("order_status", status)
            .with("refund_status", "5")
            .with("start_confirm_at", window.start_epoch().to_string())
            .with("end_confirm_at", window.end_inclusive_epoch().to_string());

        let signature = sign(
            &params,
            &self.credential.app_secret,
            SignAlgorithm::Md5Concat {
                wrap: SecretWrap::Both,
                case: HexCase::Upper,
            },
        )?;

        let mut fields = params.to_form();
        fields.push(("sign".to_string(), signature));
        Ok(PageRequest::Form {
            url: self.endpoint.clone(),
            fields,
        })
    }

    fn extract_page(&self, body: &str) -> Result<RawPage, AppError> {
        let value: Value = serde_json::from_str(body)?;

        if let Some(err) = value.get("error_response") {
            let msg = err
                .get("error_msg")
                .and_then(Value::as_str)
                .unwrap_or("未知错误");
            return Err(AppError::PlatformBusiness(format!("拼多多: {}", msg)));
        }

        let response = value
            .get("order_list_get_response")
            .ok_or_else(|| AppError::Decode("拼多多响应缺少order_list_get_response".to_string()))?;
        let orders = coerce_list(&response["order_list"]);
        Ok(RawPage {
            orders,
            has_more: None,
        })
    }
}
