// src/setup.rs
//! Setup 命令 - 交互式写入监控配置
//!
//! 收集三个必需值写入 `~/.config/homework-monitor/config.json`，
//! 已有配置会作为默认值带出，避免重复输入。

use anyhow::{anyhow, Context, Result};
use clap::Args;
use dialoguer::{Confirm, Input};
use serde_json::{json, Value};
use std::fs;

use crate::config::MonitorConfig;

/// Setup 命令参数
#[derive(Args)]
pub struct SetupArgs {
    /// 跳过确认直接写入
    #[arg(short, long)]
    pub yes: bool,
}

/// 处理 setup 命令
pub fn handle_setup(args: SetupArgs) -> Result<()> {
    let config_path =
        MonitorConfig::config_path().ok_or_else(|| anyhow!("Cannot find home directory"))?;

    println!("📋 Homework Monitor 配置向导\n");
    println!("配置文件: {}\n", config_path.display());

    // 已有配置作为各项默认值
    let existing: Option<Value> = fs::read_to_string(&config_path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok());

    let practicum_token: String = Input::new()
        .with_prompt("Practicum API token")
        .default(existing_value(&existing, "practicum_token"))
        .interact_text()
        .context("读取 Practicum token 失败")?;

    let telegram_token: String = Input::new()
        .with_prompt("Telegram bot token")
        .default(existing_value(&existing, "telegram_token"))
        .interact_text()
        .context("读取 Telegram token 失败")?;

    let telegram_chat_id: String = Input::new()
        .with_prompt("Telegram chat ID")
        .default(existing_value(&existing, "telegram_chat_id"))
        .interact_text()
        .context("读取 chat ID 失败")?;

    if practicum_token.is_empty() || telegram_token.is_empty() || telegram_chat_id.is_empty() {
        return Err(anyhow!("三个配置值都不能为空"));
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("写入 {} ?", config_path.display()))
            .default(true)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("已取消");
            return Ok(());
        }
    }

    // 保留文件里已有的可选项（endpoint、poll_interval_secs 等）
    let mut config = existing.unwrap_or_else(|| json!({}));
    match config.as_object_mut() {
        Some(object) => {
            object.insert("practicum_token".to_string(), json!(practicum_token));
            object.insert("telegram_token".to_string(), json!(telegram_token));
            object.insert("telegram_chat_id".to_string(), json!(telegram_chat_id));
        }
        None => {
            config = json!({
                "practicum_token": practicum_token,
                "telegram_token": telegram_token,
                "telegram_chat_id": telegram_chat_id,
            });
        }
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建目录失败: {}", parent.display()))?;
    }
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("写入配置失败: {}", config_path.display()))?;

    println!("✅ 已写入 {}", config_path.display());
    println!("\n下一步: 运行 `hwm check` 验证配置");
    Ok(())
}

/// 从已有配置取默认值，数字（如 chat ID）转成字符串
fn existing_value(existing: &Option<Value>, key: &str) -> String {
    existing
        .as_ref()
        .and_then(|config| config.get(key))
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_value_reads_strings() {
        let existing = Some(json!({ "practicum_token": "abc" }));
        assert_eq!(existing_value(&existing, "practicum_token"), "abc");
    }

    #[test]
    fn test_existing_value_converts_numbers() {
        let existing = Some(json!({ "telegram_chat_id": 6615343369_i64 }));
        assert_eq!(existing_value(&existing, "telegram_chat_id"), "6615343369");
    }

    #[test]
    fn test_existing_value_defaults_to_empty() {
        assert_eq!(existing_value(&None, "practicum_token"), "");

        let existing = Some(json!({ "other": "x" }));
        assert_eq!(existing_value(&existing, "practicum_token"), "");
    }
}
