//! Telegram 渠道
//!
//! 通过 Bot API 的 `sendMessage` 发送纯文本消息。任何失败
//! （网络、非 2xx、`ok=false`）都折叠为 [`SendResult::Failed`]，
//! 发送永远不会让调用方崩溃。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::channel::{MessageChannel, SendResult};

/// Telegram 渠道配置
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token
    pub bot_token: String,
    /// 通知目标 chat ID
    pub chat_id: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            timeout_secs: 30,
        }
    }
}

/// `sendMessage` 请求载荷
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Bot API 统一响应外壳
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram 渠道
pub struct TelegramChannel {
    client: Client,
    config: TelegramConfig,
    dry_run: bool,
}

impl TelegramChannel {
    /// 创建渠道，token 和 chat ID 都不能为空
    pub fn new(config: TelegramConfig) -> anyhow::Result<Self> {
        if config.bot_token.is_empty() {
            return Err(anyhow::anyhow!("Telegram bot_token is required"));
        }
        if config.chat_id.is_empty() {
            return Err(anyhow::anyhow!("Telegram chat_id is required"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self {
            client,
            config,
            dry_run: false,
        })
    }

    /// 设置 dry-run 模式：只打印消息，不真正发送
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// `sendMessage` 接口地址（包含 token，不能进日志）
    fn send_url(&self) -> String {
        format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        )
    }
}

#[async_trait]
impl MessageChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> SendResult {
        if self.dry_run {
            eprintln!(
                "[DRY-RUN] Would send to telegram chat {}: {}",
                self.config.chat_id, text
            );
            return SendResult::Skipped("dry-run".to_string());
        }

        let payload = SendMessagePayload {
            chat_id: &self.config.chat_id,
            text,
        };

        let response = match self
            .client
            .post(self.send_url())
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(channel = "telegram", error = %e, "Message send failed");
                return SendResult::Failed(format!("HTTP request failed: {}", e));
            }
        };

        let status = response.status();
        match response.json::<BotApiResponse>().await {
            Ok(api) if api.ok => {
                debug!(channel = "telegram", chat_id = %self.config.chat_id, "Message sent");
                SendResult::Sent
            }
            Ok(api) => {
                let reason = api
                    .description
                    .unwrap_or_else(|| format!("Bot API returned ok=false ({})", status));
                warn!(channel = "telegram", error = %reason, "Message rejected by Bot API");
                SendResult::Failed(reason)
            }
            Err(e) => {
                warn!(channel = "telegram", error = %e, "Cannot parse Bot API response");
                SendResult::Failed(format!("Cannot parse Bot API response: {}", e))
            }
        }
    }
}
