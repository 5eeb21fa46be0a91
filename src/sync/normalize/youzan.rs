use serde_json::Value;

use crate::sync::model::{CanonicalOrderLine, ShopConfig};
use crate::sync::normalize::{f64_of, shop_remark, str_of, NormalizeOutput};
use crate::sync::platform::Platform;
use crate::time_util::parse_datetime;

fn map_status(status: &str) -> String {
    match status {
        "WAIT_BUYER_CONFIRM_GOODS" => "已发货".to_string(),
        "TRADE_SUCCESS" => "交易完成".to_string(),
        "WAIT_BUYER_PAY" => "已付款".to_string(),
        "WAIT_SELLER_SEND_GOODS" => "待发货".to_string(),
        other => other.to_string(),
    }
}

pub(super) fn normalize(raw_orders: &[Value], shop: &ShopConfig) -> NormalizeOutput {
    let mut out = NormalizeOutput::default();
    let remark = shop_remark(shop, Platform::Youzan);

    for entry in raw_orders {
        // 列表元素包在full_order_info里，个别接口版本直接返回订单体
        let info = match entry.get("full_order_info") {
            Some(info) => info,
            None => entry,
        };
        let order = &info["order_info"];
        let address = &info["address_info"];
        let pay = &info["pay_info"];

        out.lines.push(CanonicalOrderLine {
            platform: Platform::Youzan.as_str().to_string(),
            shop_id: shop.shop_id.clone(),
            shop_name: shop.shop_name.clone(),
            order_no: str_of(order, "tid"),
            order_status: map_status(&str_of(order, "status")),
            buyer_id: shop.shop_id.clone(),
            paid_amount: f64_of(pay, "payment"),
            order_time: parse_datetime(&str_of(order, "created")),
            pay_time: parse_datetime(&str_of(order, "pay_time")),
            ship_time: parse_datetime(&str_of(order, "consign_time")),
            confirm_time: parse_datetime(&str_of(order, "success_time")),
            consignee: str_of(address, "receiver_name"),
            province: str_of(address, "delivery_province"),
            city: str_of(address, "delivery_city"),
            county: str_of(address, "delivery_district"),
            remark: remark.clone(),
            ..Default::default()
        });
    }

    out
}
