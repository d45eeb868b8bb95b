//! 通知层 - 渠道抽象、去重门与文案组装
//!
//! # 设计目标
//! 1. 统一接口：渠道实现 `MessageChannel` trait，轮询循环不感知具体后端
//! 2. 永不致命：发送失败折叠为 `SendResult::Failed`，由循环决定是否重试
//! 3. 精确去重：`NotificationGate` 按字符串相等抑制重复消息
//! 4. 文案集中：用户可见模板统一放在 `formatter::msg`
//!
//! # 使用示例
//! ```ignore
//! use homework_monitor::notification::{MessageChannel, TelegramChannel, TelegramConfig};
//!
//! let channel = TelegramChannel::new(TelegramConfig {
//!     bot_token: "123:ABC".into(),
//!     chat_id: "42".into(),
//!     ..Default::default()
//! })?;
//! channel.send("Изменился статус проверки работы ...").await;
//! ```

pub mod channel;
pub mod formatter;
pub mod gate;
pub mod telegram;

pub use channel::{MessageChannel, SendResult};
pub use formatter::{format_failure, format_status_change, msg};
pub use gate::NotificationGate;
pub use telegram::{TelegramChannel, TelegramConfig};
