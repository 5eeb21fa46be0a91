use serde_json::Value;

use crate::error::AppError;
use crate::sync::api::OrderApi;
use crate::sync::model::{Credential, RawPage, RequestParams, ShopConfig};
use crate::sync::normalize::coerce_list;
use crate::sync::platform::{Platform, PlatformProfile};
use crate::sync::sign::{sign, HexCase, SecretWrap, SignAlgorithm};
use crate::sync::transport::PageRequest;
use crate::sync::window::TimeWindow;
use crate::time_util;

const FIELDS: &str = "tid,created,status,payment,end_time,pay_time,consign_time,sign_time,invoice_no,oaid,orders";

/// 淘宝开放平台 taobao.trades.sold.get。
/// 签名约定与拼多多相同（前后包裹+MD5大写），
/// 但timestamp是"YYYY-MM-DD HH:MM:SS"格式的北京时间，
/// 末页通过响应里的has_next显式标记判断。
pub struct TaobaoApi {
    endpoint: String,
    credential: Credential,
    page_size: u32,
}

impl TaobaoApi {
    pub fn new(shop: &ShopConfig, profile: &PlatformProfile) -> Self {
        Self {
            endpoint: profile.endpoint.clone(),
            credential: shop.credential.clone(),
            page_size: profile.page_size,
        }
    }
}

impl OrderApi for TaobaoApi {
    fn platform(&self) -> Platform {
        Platform::Taobao
    }

    fn build_page(
        &self,
        status: &str,
        window: &TimeWindow,
        page_no: u32,
        timestamp: i64,
    ) -> Result<PageRequest, AppError> {
        let timestamp_str = time_util::epoch_to_shanghai(timestamp)
            .map(|t| time_util::format_datetime(&t))
            .ok_or_else(|| AppError::Encoding(format!("非法时间戳: {}", timestamp)))?;

        let params = RequestParams::new()
            .with("method", "taobao.trades.sold.get")
            .with("app_key", self.credential.app_key.clone())
            .with("session", self.credential.access_token.clone())
            .with("timestamp", timestamp_str)
            .with("v", "2.0")
            .with("sign_method", "md5")
            .with("format", "json")
            .with("start_created", window.start_str())
            .with("end_created", window.end_inclusive_str())
            .with("page_no", page_no.to_string())
            .with("page_size", self.page_size.to_string())
            .with("use_has_next", "true")
            .with("status", status)
            .with("fields", FIELDS);

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
                .get("msg")
                .or_else(|| err.get("sub_msg"))
                .and_then(Value::as_str)
                .unwrap_or("未知错误");
            return Err(AppError::PlatformBusiness(format!("淘宝: {}", msg)));
        }

        let response = value
            .get("trades_sold_get_response")
            .ok_or_else(|| AppError::Decode("淘宝响应缺少trades_sold_get_response".to_string()))?;
        // trade偶尔会以单个对象返回，这里统一成列表
        let orders = coerce_list(&response["trades"]["trade"]);
        let has_more = response.get("has_next").and_then(Value::as_bool);
        Ok(RawPage { orders, has_more })
    }
}
