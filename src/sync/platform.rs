use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 接入的电商平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Jushuitan,
    Pinduoduo,
    Taobao,
    Youzan,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Jushuitan => "jushuitan",
            Platform::Pinduoduo => "pinduoduo",
            Platform::Taobao => "taobao",
            Platform::Youzan => "youzan",
        }
    }

    /// 规范记录缺省备注使用的中文名
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Jushuitan => "聚水潭",
            Platform::Pinduoduo => "拼多多",
            Platform::Taobao => "淘宝",
            Platform::Youzan => "有赞",
        }
    }
}

/// 单平台的拉取配置。窗口边界和页数上限都是配置项，不在代码里写死。
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub endpoint: String,
    pub page_size: u32,
    /// 单窗口安全页数上限，达到上限仍未到自然末页记为截断
    pub max_pages: u32,
    /// 同平台相邻页请求之间的固定间隔
    pub pace: Duration,
    /// 逐个状态各跑一轮分页
    pub statuses: Vec<String>,
    /// 把查询区间按这些小时边界预切分，空表示不切分
    pub window_boundaries: Vec<u32>,
}

impl PlatformProfile {
    pub fn defaults(platform: Platform) -> Self {
        match platform {
            Platform::Jushuitan => PlatformProfile {
                endpoint: "https://openapi.jushuitan.com/open/orders/single/query".to_string(),
                page_size: 100,
                max_pages: 100,
                pace: Duration::from_millis(500),
                statuses: ["WaitConfirm", "WaitFConfirm", "Sent", "Merged", "Delivering"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                window_boundaries: vec![],
            },
            // 拼多多单查询最多翻10页，按天拉取前先切成四个时段
            Platform::Pinduoduo => PlatformProfile {
                endpoint: "https://gw-api.pinduoduo.com/api/router".to_string(),
                page_size: 100,
                max_pages: 10,
                pace: Duration::from_millis(500),
                statuses: vec!["5".to_string()],
                window_boundaries: vec![0, 6, 12, 18],
            },
            Platform::Taobao => PlatformProfile {
                endpoint: "https://gw.api.taobao.com/router/rest".to_string(),
                page_size: 100,
                max_pages: 100,
                pace: Duration::from_millis(125),
                statuses: [
                    "TRADE_FINISHED",
                    "WAIT_BUYER_CONFIRM_GOODS",
                    "SELLER_CONSIGNED_PART",
                    "WAIT_SELLER_SEND_GOODS",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                window_boundaries: vec![],
            },
            Platform::Youzan => PlatformProfile {
                endpoint: "https://open.youzanyun.com/api/youzan.trades.sold.get/4.0.4".to_string(),
                page_size: 100,
                max_pages: 100,
                pace: Duration::from_millis(1000),
                statuses: [
                    "WAIT_BUYER_CONFIRM_GOODS",
                    "TRADE_SUCCESS",
                    "WAIT_BUYER_PAY",
                    "WAIT_SELLER_SEND_GOODS",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                window_boundaries: vec![],
            },
        }
    }
}
