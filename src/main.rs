//! Homework Monitor CLI
//!
//! 轮询 Practicum 作业评审状态，状态变化时推送 Telegram 通知

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use homework_monitor::{
    setup::{handle_setup, SetupArgs},
    validate_response, verdict_text, MessageChannel, MonitorConfig, PracticumClient, SendResult,
    StatusApi, StatusWatcher, TelegramChannel, TelegramConfig,
};

#[derive(Parser)]
#[command(name = "hwm")]
#[command(about = "Homework Monitor - 轮询作业评审状态并推送 Telegram 通知")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动轮询监控（前台运行，Ctrl+C 停止）
    Start {
        /// 轮询间隔（秒），默认读配置文件，再兜底 100 秒
        #[arg(long, short)]
        interval: Option<u64>,
        /// Dry-run 模式（只打印不发送）
        #[arg(long)]
        dry_run: bool,
    },
    /// 拉取一次全部历史状态并打印（不发送通知）
    Check,
    /// 发送一条测试消息验证 Telegram 配置
    Test {
        /// 消息内容
        #[arg(default_value = "Homework Monitor: проверка связи")]
        message: String,
    },
    /// 交互式配置 tokens
    Setup(SetupArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 日志级别通过 RUST_LOG 控制，默认 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("homework_monitor=info,hwm=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { interval, dry_run } => {
            let config = load_config_or_exit();
            let interval = Duration::from_secs(interval.unwrap_or(config.poll_interval_secs));

            let api = PracticumClient::new(&config)?;
            let channel = telegram_channel(&config)?.with_dry_run(dry_run);

            let mut watcher = StatusWatcher::new(Arc::new(api), Arc::new(channel), interval);
            watcher.run().await;
        }
        Commands::Check => {
            let config = load_config_or_exit();
            let api = PracticumClient::new(&config)?;

            println!("拉取全部历史状态...");
            let raw = match api.fetch(0).await {
                Ok(raw) => raw,
                Err(e) => {
                    eprintln!("❌ API 请求失败: {}", e);
                    std::process::exit(1);
                }
            };
            let response = match validate_response(&raw) {
                Ok(response) => response,
                Err(e) => {
                    eprintln!("❌ 响应校验失败: {}", e);
                    std::process::exit(1);
                }
            };

            if response.homeworks.is_empty() {
                println!("没有任何提交记录");
            } else {
                println!("共 {} 条提交:\n", response.homeworks.len());
                for submission in &response.homeworks {
                    println!(
                        "  {} | {} | {}",
                        submission.date_updated,
                        submission.homework_name,
                        verdict_text(&submission.status)
                    );
                }
            }
            println!("\n服务端时间戳: {}", response.current_date);
            println!("✅ 配置与 API 连通性正常");
        }
        Commands::Test { message } => {
            let config = load_config_or_exit();
            let channel = telegram_channel(&config)?;

            match channel.send(&message).await {
                SendResult::Sent => {
                    println!("✅ 测试消息已发送到 chat {}", config.telegram_chat_id)
                }
                SendResult::Skipped(reason) => println!("测试消息被跳过: {}", reason),
                SendResult::Failed(error) => {
                    eprintln!("❌ 发送失败: {}", error);
                    std::process::exit(1);
                }
            }
        }
        Commands::Setup(args) => {
            handle_setup(args)?;
        }
    }

    Ok(())
}

/// 加载配置；缺失必需值时直接退出，不进入轮询
fn load_config_or_exit() -> MonitorConfig {
    match MonitorConfig::auto_load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ 配置加载失败: {}", e);
            std::process::exit(1);
        }
    }
}

/// 用监控配置组装 Telegram 渠道
fn telegram_channel(config: &MonitorConfig) -> Result<TelegramChannel> {
    TelegramChannel::new(TelegramConfig {
        bot_token: config.telegram_token.clone(),
        chat_id: config.telegram_chat_id.clone(),
        timeout_secs: config.timeout_secs,
    })
}
