use serde_json::json;

use order_sync::sync::model::{Credential, ShopConfig};
use order_sync::sync::normalize::normalize_batch;
use order_sync::sync::platform::Platform;

fn shop(platform: Platform) -> ShopConfig {
    ShopConfig {
        shop_name: "测试店".to_string(),
        platform,
        shop_id: "10001".to_string(),
        credential: Credential {
            app_key: "k".to_string(),
            app_secret: "s".to_string(),
            access_token: "t".to_string(),
            refresh_token: None,
        },
        referrer_keep: None,
        remark: None,
    }
}

#[test]
fn test_jushuitan_flattens_items() {
    let order = json!({
        "so_id": "SO1001",
        "status": "Sent",
        "pay_amount": "59.80",
        "order_date": "2025-10-01 10:00:00",
        "ts": 888,
        "consignee": {"name": "张三", "province": "浙江省", "city": "杭州市", "county": "西湖区"},
        "items": [
            {"sku_id": "SKU-A", "i_id": "I1", "name": "商品A", "qty": 2, "price": 19.9},
            {"sku_id": "SKU-B", "i_id": "I2", "name": "商品B", "qty": 1, "price": 20.0, "outer_oi_id": "OUT-1"}
        ]
    });

    let out = normalize_batch(Platform::Jushuitan, &[order], &shop(Platform::Jushuitan));
    assert_eq!(out.lines.len(), 2);
    assert_eq!(out.max_ts, Some(888));

    let a = &out.lines[0];
    assert_eq!(a.order_no, "SO1001");
    assert_eq!(a.order_status, "已发货");
    assert_eq!(a.sku_id, "SKU-A");
    assert_eq!(a.quantity, 2);
    assert_eq!(a.paid_amount, 59.8);
    assert_eq!(a.consignee, "张三");
    assert_eq!(a.remark, "聚水潭");

    // 明细上的外部子单号覆盖订单级的
    assert_eq!(out.lines[1].sub_order_no, "OUT-1");
}

#[test]
fn test_jushuitan_missing_items_yields_base_line() {
    let order = json!({
        "so_id": "SO1002",
        "status": "WaitConfirm",
        "consignee": "",
        "pay_date": "not a date"
    });

    let out = normalize_batch(Platform::Jushuitan, &[order], &shop(Platform::Jushuitan));
    assert_eq!(out.lines.len(), 1);
    let line = &out.lines[0];
    assert_eq!(line.order_status, "已付款");
    // consignee是空字符串而不是对象，各收货字段保持为空
    assert_eq!(line.consignee, "");
    // 解析不了的时间保持None而不是当前时间
    assert!(line.pay_time.is_none());
}

#[test]
fn test_jushuitan_referrer_filter() {
    let mut cfg = shop(Platform::Jushuitan);
    cfg.referrer_keep = Some(vec!["自营".to_string()]);
    let orders = vec![
        json!({"so_id": "A", "referrer_name": ""}),
        json!({"so_id": "B", "referrer_name": "自营"}),
        json!({"so_id": "C", "referrer_name": "分销商X"}),
    ];

    let out = normalize_batch(Platform::Jushuitan, &orders, &cfg);
    assert_eq!(out.lines.len(), 2);
    assert_eq!(out.filtered, 1);
}

#[test]
fn test_taobao_single_object_sub_order() {
    // 只有一个子订单时平台返回对象而不是数组
    let trade = json!({
        "tid": "T1",
        "status": "TRADE_FINISHED",
        "payment": "100.00",
        "orders": {"order": {"oid": "O1", "num_iid": 42, "title": "单品", "num": 1, "price": "100.00", "cid": 50001}}
    });

    let out = normalize_batch(Platform::Taobao, &[trade], &shop(Platform::Taobao));
    assert_eq!(out.lines.len(), 1);
    let line = &out.lines[0];
    assert_eq!(line.sub_order_no, "O1");
    assert_eq!(line.order_status, "交易完成");
    assert_eq!(line.cid, Some(50001));
    assert_eq!(line.item_id, "42");
}

#[test]
fn test_taobao_unknown_status_kept_raw() {
    let trade = json!({"tid": "T2", "status": "TRADE_CLOSED"});
    let out = normalize_batch(Platform::Taobao, &[trade], &shop(Platform::Taobao));
    assert_eq!(out.lines[0].order_status, "TRADE_CLOSED");
}

#[test]
fn test_pinduoduo_item_list() {
    let order = json!({
        "order_sn": "PDD-1",
        "pay_amount": 35.0,
        "pay_time": "2025-10-01 12:30:00",
        "item_list": [
            {"goods_id": 7, "goods_name": "袜子", "sku_id": 70, "goods_count": 3, "goods_price": 10.0},
            {"goods_id": 8, "goods_name": "手套", "sku_id": 80, "goods_count": 1, "goods_price": 5.0}
        ]
    });

    let out = normalize_batch(Platform::Pinduoduo, &[order], &shop(Platform::Pinduoduo));
    assert_eq!(out.lines.len(), 2);
    assert_eq!(out.lines[0].order_status, "已付款");
    assert_eq!(out.lines[0].quantity, 3);
    assert_eq!(out.lines[0].pay_time, out.lines[0].ship_time);
}

#[test]
fn test_youzan_one_line_per_order() {
    let entry = json!({
        "full_order_info": {
            "order_info": {"tid": "YZ-1", "status": "TRADE_SUCCESS", "created": "2025-10-01 09:00:00"},
            "address_info": {"receiver_name": "李四", "delivery_province": "广东省"},
            "pay_info": {"payment": "66.60"}
        }
    });

    let out = normalize_batch(Platform::Youzan, &[entry], &shop(Platform::Youzan));
    assert_eq!(out.lines.len(), 1);
    let line = &out.lines[0];
    assert_eq!(line.order_no, "YZ-1");
    assert_eq!(line.order_status, "交易完成");
    assert_eq!(line.consignee, "李四");
    assert_eq!(line.paid_amount, 66.6);
}

#[test]
fn test_shop_remark_override() {
    let mut cfg = shop(Platform::Youzan);
    cfg.remark = Some("品牌直营".to_string());
    let entry = json!({"order_info": {"tid": "YZ-2", "status": "WAIT_BUYER_PAY"}});
    let out = normalize_batch(Platform::Youzan, &[entry], &cfg);
    assert_eq!(out.lines[0].remark, "品牌直营");
}
