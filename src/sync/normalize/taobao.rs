use serde_json::Value;

use crate::sync::model::{CanonicalOrderLine, ShopConfig};
use crate::sync::normalize::{coerce_list, f64_of, i64_of, shop_remark, str_of, u32_of, NormalizeOutput};
use crate::sync::platform::Platform;
use crate::time_util::parse_datetime;

fn map_status(status: &str) -> String {
    match status {
        "TRADE_FINISHED" => "交易完成".to_string(),
        "WAIT_BUYER_CONFIRM_GOODS" => "已发货".to_string(),
        "SELLER_CONSIGNED_PART" => "已付款部分发货".to_string(),
        "WAIT_SELLER_SEND_GOODS" => "已付款待发货".to_string(),
        other => other.to_string(),
    }
}

pub(super) fn normalize(raw_orders: &[Value], shop: &ShopConfig) -> NormalizeOutput {
    let mut out = NormalizeOutput::default();
    let remark = shop_remark(shop, Platform::Taobao);

    for trade in raw_orders {
        let base = CanonicalOrderLine {
            platform: Platform::Taobao.as_str().to_string(),
            shop_id: shop.shop_id.clone(),
            shop_name: shop.shop_name.clone(),
            order_no: str_of(trade, "tid"),
            order_status: map_status(&str_of(trade, "status")),
            buyer_id: str_of(trade, "buyer_open_uid"),
            paid_amount: f64_of(trade, "payment"),
            order_time: parse_datetime(&str_of(trade, "created")),
            pay_time: parse_datetime(&str_of(trade, "pay_time")),
            ship_time: parse_datetime(&str_of(trade, "consign_time")),
            confirm_time: parse_datetime(&str_of(trade, "end_time")),
            consignee: str_of(trade, "oaid"),
            tracking_no: str_of(trade, "invoice_no"),
            remark: remark.clone(),
            ..Default::default()
        };

        // 子订单orders.order也会以单个对象返回
        let items = coerce_list(&trade["orders"]["order"]);
        if items.is_empty() {
            out.lines.push(base);
            continue;
        }
        for item in &items {
            let mut line = base.clone();
            line.sub_order_no = str_of(item, "oid");
            line.item_id = str_of(item, "num_iid");
            line.item_name = str_of(item, "title");
            line.sku_id = str_of(item, "sku_id");
            line.outer_id = str_of(item, "outer_iid");
            line.quantity = u32_of(item, "num");
            line.unit_price = f64_of(item, "price");
            // 类目名称在批量查询后回填
            line.cid = i64_of(item, "cid");
            out.lines.push(line);
        }
    }

    out
}
