use serde_json::Value;

use crate::sync::model::{CanonicalOrderLine, ShopConfig};
use crate::sync::normalize::{coerce_list, f64_of, i64_of, shop_remark, str_of, u32_of, NormalizeOutput};
use crate::sync::platform::Platform;
use crate::time_util::parse_datetime;

fn map_status(status: &str) -> String {
    match status {
        "WaitConfirm" | "WaitFConfirm" => "已付款".to_string(),
        "Sent" => "已发货".to_string(),
        "Merged" | "Delivering" => "发货中".to_string(),
        other => other.to_string(),
    }
}

pub(super) fn normalize(raw_orders: &[Value], shop: &ShopConfig) -> NormalizeOutput {
    let mut out = NormalizeOutput::default();
    let remark = shop_remark(shop, Platform::Jushuitan);

    for order in raw_orders {
        // 分销过滤：只保留referrer_name为空或在保留名单内的订单
        if let Some(keep) = &shop.referrer_keep {
            let referrer = str_of(order, "referrer_name");
            if !referrer.is_empty() && !keep.iter().any(|k| k == &referrer) {
                out.filtered += 1;
                continue;
            }
        }

        if let Some(ts) = i64_of(order, "ts") {
            out.max_ts = Some(out.max_ts.map_or(ts, |cur| cur.max(ts)));
        }

        // consignee可能是对象，也可能是空字符串
        let consignee = order.get("consignee").cloned().unwrap_or(Value::Null);

        let base = CanonicalOrderLine {
            platform: Platform::Jushuitan.as_str().to_string(),
            shop_id: shop.shop_id.clone(),
            shop_name: shop.shop_name.clone(),
            order_no: str_of(order, "so_id"),
            sub_order_no: str_of(order, "outer_oi_id"),
            order_status: map_status(&str_of(order, "status")),
            buyer_id: str_of(order, "buyer_id"),
            paid_amount: f64_of(order, "pay_amount"),
            order_time: parse_datetime(&str_of(order, "order_date")),
            pay_time: parse_datetime(&str_of(order, "pay_date")),
            ship_time: parse_datetime(&str_of(order, "send_date")),
            confirm_time: parse_datetime(&str_of(order, "end_time")),
            consignee: str_of(&consignee, "name"),
            province: str_of(&consignee, "province"),
            city: str_of(&consignee, "city"),
            county: str_of(&consignee, "county"),
            tracking_no: str_of(order, "l_id"),
            remark: remark.clone(),
            ..Default::default()
        };

        let items = coerce_list(&order["items"]);
        if items.is_empty() {
            out.lines.push(base);
            continue;
        }
        for item in &items {
            let mut line = base.clone();
            line.sku_id = str_of(item, "sku_id");
            line.item_id = str_of(item, "i_id");
            line.item_name = str_of(item, "name");
            line.quantity = u32_of(item, "qty");
            line.unit_price = f64_of(item, "price");
            let outer = str_of(item, "outer_oi_id");
            if !outer.is_empty() {
                line.sub_order_no = outer.clone();
            }
            line.outer_id = outer;
            out.lines.push(line);
        }
    }

    out
}
