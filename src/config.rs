//! 运行配置
//!
//! 三个必需值（Practicum token、Telegram token、chat ID）每个独立解析，
//! 优先级：配置文件 > 环境变量。缺任何一个都在启动时直接失败，
//! 不会带着残缺配置进入轮询。

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 状态 API 默认地址
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// 默认轮询间隔（秒）
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 100;

/// HTTP 请求默认超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 监控配置
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Practicum API token
    pub practicum_token: String,
    /// Telegram bot token
    pub telegram_token: String,
    /// 通知目标 chat ID
    pub telegram_chat_id: String,
    /// 状态 API 地址
    pub endpoint: String,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// HTTP 超时（秒）
    pub timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            practicum_token: String::new(),
            telegram_token: String::new(),
            telegram_chat_id: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl MonitorConfig {
    /// 配置文件路径 `~/.config/homework-monitor/config.json`
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/homework-monitor/config.json"))
    }

    /// 自动加载配置
    ///
    /// 读取顺序（每个值独立）：
    /// 1. 配置文件 `~/.config/homework-monitor/config.json`
    /// 2. 环境变量 `PRACTICUM_TOKEN` / `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID`
    pub fn auto_load() -> Result<Self> {
        let file = Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| Self::read_config_file(&path));
        Self::from_sources(file.as_ref(), |name| std::env::var(name).ok())
    }

    /// 读取并解析配置文件，非法 JSON 记一条警告后忽略
    fn read_config_file(path: &Path) -> Option<Value> {
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file is not valid JSON, ignoring");
                None
            }
        }
    }

    /// 从给定来源组装配置
    fn from_sources(file: Option<&Value>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let practicum_token = resolve(file, &env, "practicum_token", "PRACTICUM_TOKEN")
            .ok_or_else(|| missing("practicum_token", "PRACTICUM_TOKEN"))?;
        let telegram_token = resolve(file, &env, "telegram_token", "TELEGRAM_TOKEN")
            .ok_or_else(|| missing("telegram_token", "TELEGRAM_TOKEN"))?;
        let telegram_chat_id = resolve(file, &env, "telegram_chat_id", "TELEGRAM_CHAT_ID")
            .ok_or_else(|| missing("telegram_chat_id", "TELEGRAM_CHAT_ID"))?;

        let endpoint = file
            .and_then(|f| f.get("endpoint"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let poll_interval_secs = file
            .and_then(|f| f.get("poll_interval_secs"))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let timeout_secs = file
            .and_then(|f| f.get("timeout_secs"))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            poll_interval_secs,
            timeout_secs,
        })
    }
}

/// 按优先级解析单个必需值，chat ID 在文件里允许写成数字
fn resolve(
    file: Option<&Value>,
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    env_name: &str,
) -> Option<String> {
    if let Some(value) = file.and_then(|f| f.get(key)) {
        if let Some(s) = value.as_str().filter(|s| !s.is_empty()) {
            return Some(s.to_string());
        }
        if let Some(n) = value.as_i64() {
            return Some(n.to_string());
        }
    }
    env(env_name).filter(|s| !s.is_empty())
}

/// 缺失必需值时的错误，同时指出三种补救方式
fn missing(key: &str, env_name: &str) -> anyhow::Error {
    anyhow!(
        "Missing required configuration value `{}`. Set the {} environment variable, \
         add `{}` to ~/.config/homework-monitor/config.json, or run `hwm setup`",
        key,
        env_name,
        key
    )
}
