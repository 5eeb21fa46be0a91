use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;

/// 一次待发送的页请求
#[derive(Debug, Clone)]
pub enum PageRequest {
    /// application/x-www-form-urlencoded（聚水潭/拼多多/淘宝）
    Form { url: String, fields: Vec<(String, String)> },
    /// application/json（有赞）
    Json { url: String, body: Value },
}

impl PageRequest {
    pub fn url(&self) -> &str {
        match self {
            PageRequest::Form { url, .. } => url,
            PageRequest::Json { url, .. } => url,
        }
    }
}

/// 发送页请求的传输层，测试时注入假实现
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn send(&self, request: &PageRequest) -> Result<String, AppError>;
}

/// 基于reqwest的真实传输，所有请求带固定超时
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageTransport for HttpTransport {
    async fn send(&self, request: &PageRequest) -> Result<String, AppError> {
        let builder = match request {
            PageRequest::Form { url, fields } => self.client.post(url).form(fields),
            PageRequest::Json { url, body } => self.client.post(url).json(body),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("url:{} status:{} body:{}", request.url(), status, body);

        if !status.is_success() {
            return Err(AppError::Transport(format!("请求状态异常: {}", status)));
        }
        Ok(body)
    }
}
