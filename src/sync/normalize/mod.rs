pub mod category;
mod jushuitan;
mod pinduoduo;
mod taobao;
mod youzan;

use serde_json::Value;

use crate::sync::model::{CanonicalOrderLine, ShopConfig};
use crate::sync::platform::Platform;

/// 一批原始订单规范化的产出
#[derive(Debug, Default)]
pub struct NormalizeOutput {
    pub lines: Vec<CanonicalOrderLine>,
    /// 被店铺过滤规则丢弃的订单数
    pub filtered: u64,
    /// 增量游标（聚水潭ts的最大值）
    pub max_ts: Option<i64>,
}

/// 把一批解码后的原始订单压平成规范订单行。
/// 订单级字段复制到每一行，商品项字段逐行合并；
/// 缺失或类型不对的嵌套结构一律用空默认值顶替，不让整批失败。
pub fn normalize_batch(platform: Platform, raw_orders: &[Value], shop: &ShopConfig) -> NormalizeOutput {
    match platform {
        Platform::Jushuitan => jushuitan::normalize(raw_orders, shop),
        Platform::Pinduoduo => pinduoduo::normalize(raw_orders, shop),
        Platform::Taobao => taobao::normalize(raw_orders, shop),
        Platform::Youzan => youzan::normalize(raw_orders, shop),
    }
}

/// 把“列表或单个对象”的字段统一成列表。
/// 接口偶尔在只有一条数据时直接返回对象，在没有数据时返回
/// 空字符串或null，这里一次性收敛，后续处理只面对列表。
pub fn coerce_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(_) => vec![value.clone()],
        _ => Vec::new(),
    }
}

/// 取字符串字段，数字也转成字符串（buyer_id等字段两种类型都出现过）
pub(crate) fn str_of(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// 取金额字段，兼容数字和数字字符串
pub(crate) fn f64_of(value: &Value, key: &str) -> f64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub(crate) fn u32_of(value: &Value, key: &str) -> u32 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn i64_of(value: &Value, key: &str) -> Option<i64> {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// 店铺备注：显式配置优先，否则用平台中文名
pub(crate) fn shop_remark(shop: &ShopConfig, platform: Platform) -> String {
    shop.remark.clone().unwrap_or_else(|| platform.label().to_string())
}
