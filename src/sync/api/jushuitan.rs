use serde_json::Value;

use crate::error::AppError;
use crate::sync::api::OrderApi;
use crate::sync::model::{Credential, RawPage, RequestParams, ShopConfig};
use crate::sync::normalize::coerce_list;
use crate::sync::platform::{Platform, PlatformProfile};
use crate::sync::sign::{sign, HexCase, SecretWrap, SignAlgorithm};
use crate::sync::transport::PageRequest;
use crate::sync::window::TimeWindow;

/// 聚水潭开放平台订单查询。
/// 签名约定：密钥只做前缀，MD5小写；分页按短页判断末页。
pub struct JushuitanApi {
    endpoint: String,
    shop_id: String,
    credential: Credential,
    page_size: u32,
}

impl JushuitanApi {
    pub fn new(shop: &ShopConfig, profile: &PlatformProfile) -> Self {
        Self {
            endpoint: profile.endpoint.clone(),
            shop_id: shop.shop_id.clone(),
            credential: shop.credential.clone(),
            page_size: profile.page_size,
        }
    }
}

impl OrderApi for JushuitanApi {
    fn platform(&self) -> Platform {
        Platform::Jushuitan
    }

    fn build_page(
        &self,
        status: &str,
        window: &TimeWindow,
        page_no: u32,
        timestamp: i64,
    ) -> Result<PageRequest, AppError> {
        // biz内部字段顺序参与签名，手工拼接并原样发送
        let biz = format!(
            r#"{{"page_index":"{}","page_size":"{}","modified_begin":"{}","modified_end":"{}","date_type":"2","shop_id":"{}","status":"{}","order_types":["普通订单"]}}"#,
            page_no,
            self.page_size,
            window.start_str(),
            window.end_inclusive_str(),
            self.shop_id,
            status,
        );

        let params = RequestParams::new()
            .with("access_token", self.credential.access_token.clone())
            .with("app_key", self.credential.app_key.clone())
            .with("biz", biz.clone())
            .with("charset", "UTF-8")
            .with("timestamp", timestamp.to_string())
            .with("version", "2");
        let signature = sign(
            &params,
            &self.credential.app_secret,
            SignAlgorithm::Md5Concat {
                wrap: SecretWrap::Prefix,
                case: HexCase::Lower,
            },
        )?;

        let fields = vec![
            ("app_key".to_string(), self.credential.app_key.clone()),
            ("access_token".to_string(), self.credential.access_token.clone()),
            ("timestamp".to_string(), timestamp.to_string()),
            ("charset".to_string(), "UTF-8".to_string()),
            ("version".to_string(), "2".to_string()),
            ("biz".to_string(), biz),
            ("sign".to_string(), signature),
        ];
        Ok(PageRequest::Form {
            url: self.endpoint.clone(),
            fields,
        })
    }

    fn extract_page(&self, body: &str) -> Result<RawPage, AppError> {
        let value: Value = serde_json::from_str(body)?;

        if let Some(code) = value.get("code").and_then(Value::as_i64) {
            if code != 0 {
                let msg = value
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or("未知错误");
                return Err(AppError::PlatformBusiness(format!("聚水潭: {} (code={})", msg, code)));
            }
        }

        let orders = coerce_list(&value["data"]["orders"]);
        Ok(RawPage {
            orders,
            has_more: None,
        })
    }
}
