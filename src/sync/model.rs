use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sync::platform::Platform;

/// 单个平台的接入凭证，由配置提供，同步期间只读
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// 一家店铺的同步配置
#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfig {
    pub shop_name: String,
    pub platform: Platform,
    pub shop_id: String,
    pub credential: Credential,
    /// 分销过滤：保留referrer_name为空或在名单内的订单（聚水潭部分店铺需要）
    #[serde(default)]
    pub referrer_keep: Option<Vec<String>>,
    /// 写入规范记录的备注，缺省使用平台名称
    #[serde(default)]
    pub remark: Option<String>,
}

/// 一次API调用的参数集合。
/// 按键字节序排序，值为None的参数在签名和发送时都会被省略。
#[derive(Debug, Clone, Default)]
pub struct RequestParams(BTreeMap<String, Option<String>>);

impl RequestParams {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), Some(value.into()));
        self
    }

    pub fn with_opt(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

    /// 按键升序遍历有值的参数
    pub fn iter_present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    /// 转换成表单键值对，省略无值参数
    pub fn to_form(&self) -> Vec<(String, String)> {
        self.iter_present()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// 一次（平台，窗口，页）请求解码后的原始页
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub orders: Vec<Value>,
    /// 平台显式返回的“还有下一页”标记，无此约定的平台为None
    pub has_more: Option<bool>,
}

/// 规范订单行：每个（订单，商品项）一条。
/// 平台上不存在的字段保留为空，不从结构中去掉。
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalOrderLine {
    pub platform: String,
    pub shop_id: String,
    pub shop_name: String,
    pub order_no: String,
    pub sub_order_no: String,
    pub order_status: String,
    pub buyer_id: String,
    pub sku_id: String,
    pub item_id: String,
    pub outer_id: String,
    pub item_name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<i64>,
    pub quantity: u32,
    pub unit_price: f64,
    pub paid_amount: f64,
    pub order_time: Option<NaiveDateTime>,
    pub pay_time: Option<NaiveDateTime>,
    pub ship_time: Option<NaiveDateTime>,
    pub confirm_time: Option<NaiveDateTime>,
    pub consignee: String,
    pub province: String,
    pub city: String,
    pub county: String,
    pub tracking_no: String,
    pub remark: String,
}

/// 单店铺一次同步的统计结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResult {
    pub raw_count: u64,
    pub filtered_count: u64,
    pub canonical_count: u64,
    pub inserted: u64,
    pub duplicates: u64,
    /// 到达安全页数上限仍未出现自然末页的窗口数
    pub truncated_windows: u32,
    pub window_errors: Vec<String>,
    /// 聚水潭增量游标：本次拉取到的最大ts
    pub max_ts: Option<i64>,
}

impl SyncResult {
    pub fn truncated(&self) -> bool {
        self.truncated_windows > 0
    }

    pub fn complete(&self) -> bool {
        self.window_errors.is_empty() && !self.truncated()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_request_params_skip_absent() {
        let params = RequestParams::new()
            .with("b", "2")
            .with("a", "1")
            .with_opt("c", None);
        let keys: Vec<&str> = params.iter_present().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(params.to_form().len(), 2);
    }
}
