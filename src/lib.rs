//! Homework Monitor - 轮询作业评审状态并推送 Telegram 通知

pub mod api;
pub mod config;
pub mod notification;
pub mod setup;
pub mod submission;
pub mod validator;
pub mod verdict;
pub mod watcher;

pub use api::{ApiError, PracticumClient, StatusApi};
pub use config::MonitorConfig;
pub use notification::{
    format_failure, format_status_change, MessageChannel, NotificationGate, SendResult,
    TelegramChannel, TelegramConfig,
};
pub use submission::{PollResponse, Submission};
pub use validator::{validate_response, ValidationError};
pub use verdict::{verdict_for, verdict_text};
pub use watcher::{CycleError, CycleOutcome, PollState, StatusWatcher};
