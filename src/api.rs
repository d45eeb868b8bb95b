//! 状态 API 客户端
//!
//! 只负责「带认证的 GET + 解码 JSON」这一层；结构校验交给
//! `validator`。传输失败和非 2xx 响应是两类不同的错误，
//! 后者带上状态码、原因短语和响应体片段方便排查。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::MonitorConfig;

/// 错误详情里保留的响应体最大长度（字符）
const BODY_SNIPPET_CHARS: usize = 200;

/// 状态 API 错误，全部视为瞬态
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 网络层失败：连接、超时、DNS
    #[error("status API request failed: {0}")]
    Transport(String),
    /// 请求到达了服务端但拿到非 2xx 响应
    #[error("status API returned {code} {reason}: {body}")]
    InvalidResponseCode {
        /// HTTP 状态码
        code: u16,
        /// 原因短语
        reason: String,
        /// 响应体片段
        body: String,
    },
    /// 响应体不是合法 JSON
    #[error("status API response is not valid JSON: {0}")]
    Decode(String),
}

/// 抓取能力接口，轮询循环只依赖这个抽象
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// 拉取指定时间戳之后的状态变更，返回未校验的原始 JSON
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError>;
}

/// Practicum 作业状态 API 客户端
#[derive(Debug, Clone)]
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// 根据配置创建客户端
    pub fn new(config: &MonitorConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.practicum_token.clone(),
        })
    }

    /// 覆盖 API 地址（测试用）
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl StatusApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError> {
        debug!(from_date, "Requesting submission statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::InvalidResponseCode {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
                body: snippet(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// 按字符截断响应体，避免把整页 HTML 塞进错误信息
fn snippet(body: &str) -> String {
    if body.chars().count() > BODY_SNIPPET_CHARS {
        let cut: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
