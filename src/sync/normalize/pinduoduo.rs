use serde_json::Value;

use crate::sync::model::{CanonicalOrderLine, ShopConfig};
use crate::sync::normalize::{coerce_list, f64_of, shop_remark, str_of, u32_of, NormalizeOutput};
use crate::sync::platform::Platform;
use crate::time_util::parse_datetime;

pub(super) fn normalize(raw_orders: &[Value], shop: &ShopConfig) -> NormalizeOutput {
    let mut out = NormalizeOutput::default();
    let remark = shop_remark(shop, Platform::Pinduoduo);

    for order in raw_orders {
        // 查询条件限定确认收货的订单，状态统一记为已付款
        let pay_time = parse_datetime(&str_of(order, "pay_time"));
        let base = CanonicalOrderLine {
            platform: Platform::Pinduoduo.as_str().to_string(),
            shop_id: shop.shop_id.clone(),
            shop_name: shop.shop_name.clone(),
            order_no: str_of(order, "order_sn"),
            order_status: "已付款".to_string(),
            paid_amount: f64_of(order, "pay_amount"),
            order_time: pay_time,
            pay_time,
            ship_time: pay_time,
            tracking_no: str_of(order, "tracking_number"),
            remark: remark.clone(),
            ..Default::default()
        };

        let items = coerce_list(&order["item_list"]);
        if items.is_empty() {
            out.lines.push(base);
            continue;
        }
        for item in &items {
            let mut line = base.clone();
            line.item_id = str_of(item, "goods_id");
            line.item_name = str_of(item, "goods_name");
            line.sku_id = str_of(item, "sku_id");
            line.outer_id = str_of(item, "outer_id");
            line.sub_order_no = str_of(item, "outer_goods_id");
            line.quantity = u32_of(item, "goods_count");
            line.unit_price = f64_of(item, "goods_price");
            out.lines.push(line);
        }
    }

    out
}
