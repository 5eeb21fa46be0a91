use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::AppError;
use crate::sync::model::{RequestParams, SyncResult};
use crate::sync::sign::{sign, SignAlgorithm};
use crate::sync::sink::SyncNotifier;
use crate::time_util;

/// 钉钉群机器人通知。
/// webhook带access_token，加签模式下再追加毫秒时间戳和签名。
pub struct DingTalkNotifier {
    client: Client,
    webhook: String,
    secret: String,
}

impl DingTalkNotifier {
    pub fn new(webhook: String, secret: String) -> Self {
        Self {
            client: Client::new(),
            webhook,
            secret,
        }
    }

    /// 从环境变量装配，未配置webhook时返回None
    pub fn from_env() -> Option<Self> {
        let webhook = std::env::var("DINGTALK_WEBHOOK").ok()?;
        if webhook.is_empty() {
            return None;
        }
        let secret = std::env::var("DINGTALK_SECRET").unwrap_or_default();
        Some(Self::new(webhook, secret))
    }

    fn signed_url(&self, timestamp_ms: i64) -> Result<String, AppError> {
        if self.secret.is_empty() {
            return Ok(self.webhook.clone());
        }
        let params = RequestParams::new().with("timestamp", timestamp_ms.to_string());
        let signature = sign(&params, &self.secret, SignAlgorithm::HmacSha256)?;
        Ok(format!(
            "{}&timestamp={}&sign={}",
            self.webhook, timestamp_ms, signature
        ))
    }

    fn render_markdown(shop_name: &str, result: &SyncResult) -> String {
        let mut text = format!(
            "### {} 订单同步\n\n\
             - 原始订单: {}\n\
             - 过滤订单: {}\n\
             - 规范订单行: {}\n\
             - 插入: {}\n\
             - 重复: {}\n",
            shop_name,
            result.raw_count,
            result.filtered_count,
            result.canonical_count,
            result.inserted,
            result.duplicates,
        );
        if result.truncated() {
            text.push_str(&format!("- 截断窗口: {}（结果可能不完整）\n", result.truncated_windows));
        }
        for err in &result.window_errors {
            text.push_str(&format!("- 异常: {}\n", err));
        }
        text.push_str(&format!(
            "\n处理时间: {}",
            time_util::format_datetime(&time_util::now_shanghai())
        ));
        text
    }

    async fn post(&self, shop_name: &str, result: &SyncResult) -> Result<(), AppError> {
        let timestamp_ms = time_util::now_epoch_seconds() * 1000;
        let url = self.signed_url(timestamp_ms)?;
        let body = json!({
            "msgtype": "markdown",
            "markdown": {
                "title": format!("{} 订单同步", shop_name),
                "text": Self::render_markdown(shop_name, result),
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let reply: Value = response.json().await?;
        debug!("钉钉通知响应: {}", reply);
        let errcode = reply.get("errcode").and_then(Value::as_i64).unwrap_or(-1);
        if errcode != 0 {
            let errmsg = reply.get("errmsg").and_then(Value::as_str).unwrap_or("未知错误");
            return Err(AppError::PlatformBusiness(format!("钉钉通知失败: {}", errmsg)));
        }
        Ok(())
    }
}

#[async_trait]
impl SyncNotifier for DingTalkNotifier {
    async fn notify(&self, shop_name: &str, result: &SyncResult) -> anyhow::Result<()> {
        self.post(shop_name, result).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_markdown_counts() {
        let result = SyncResult {
            raw_count: 137,
            canonical_count: 150,
            inserted: 148,
            duplicates: 2,
            ..Default::default()
        };
        let text = DingTalkNotifier::render_markdown("旗舰店", &result);
        assert!(text.contains("旗舰店"));
        assert!(text.contains("原始订单: 137"));
        assert!(text.contains("插入: 148"));
        assert!(!text.contains("截断窗口"));
    }

    #[test]
    fn test_signed_url_without_secret() {
        let notifier = DingTalkNotifier::new("https://oapi.dingtalk.com/robot/send?access_token=x".to_string(), String::new());
        let url = notifier.signed_url(1700000000000).unwrap();
        assert!(!url.contains("sign="));
    }

    #[test]
    fn test_signed_url_with_secret() {
        let notifier = DingTalkNotifier::new(
            "https://oapi.dingtalk.com/robot/send?access_token=x".to_string(),
            "SEC000".to_string(),
        );
        let url = notifier.signed_url(1700000000000).unwrap();
        assert!(url.contains("&timestamp=1700000000000&sign="));
    }
}
