pub mod jushuitan;
pub mod pinduoduo;
pub mod taobao;
pub mod youzan;

use crate::error::AppError;
use crate::sync::model::{RawPage, ShopConfig};
use crate::sync::platform::{Platform, PlatformProfile};
use crate::sync::transport::PageRequest;
use crate::sync::window::TimeWindow;

/// 单平台订单接口：构造一页的签名请求、解出一页的原始订单。
/// 两步都是纯函数，时间戳由分页循环传入。
pub trait OrderApi: Send + Sync {
    fn platform(&self) -> Platform;

    /// 构造第page_no页的请求。每页都重新构参、重新签名。
    fn build_page(
        &self,
        status: &str,
        window: &TimeWindow,
        page_no: u32,
        timestamp: i64,
    ) -> Result<PageRequest, AppError>;

    /// 从响应体解出一页订单；平台业务错误在这里转换为PlatformBusiness
    fn extract_page(&self, body: &str) -> Result<RawPage, AppError>;
}

pub fn make_api(shop: &ShopConfig, profile: &PlatformProfile) -> Box<dyn OrderApi> {
    match shop.platform {
        Platform::Jushuitan => Box::new(jushuitan::JushuitanApi::new(shop, profile)),
        Platform::Pinduoduo => Box::new(pinduoduo::PinduoduoApi::new(shop, profile)),
        Platform::Taobao => Box::new(taobao::TaobaoApi::new(shop, profile)),
        Platform::Youzan => Box::new(youzan::YouzanApi::new(shop, profile)),
    }
}
