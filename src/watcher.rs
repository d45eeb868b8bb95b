//! 轮询循环
//!
//! 每一轮依次经过 抓取 → 校验 → 比对 → 通知 → 休眠；任何一步
//! 失败都转入错误通道：记日志、组装错误通知、经错误门去重后
//! 尽力发送，然后照常休眠。循环没有终止状态，进程只能从外部
//! 结束。
//!
//! 游标只在「抓取 + 校验 + 通知」整体走通后才前进到响应的
//! `current_date`；发送失败的那一轮游标不动，下一轮用同一
//! 时间戳重新抓取并重试，送达语义是至少一次。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, StatusApi};
use crate::notification::channel::{MessageChannel, SendResult};
use crate::notification::formatter::{format_failure, format_status_change};
use crate::notification::gate::NotificationGate;
use crate::validator::{validate_response, ValidationError};

/// 单轮失败，错误通道承载的两类瞬态错误
#[derive(Debug, Clone, Error)]
pub enum CycleError {
    /// 抓取阶段失败
    #[error("{0}")]
    Api(#[from] ApiError),
    /// 校验阶段失败
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// 单轮结果
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// 发送了一条新的状态通知
    Notified(String),
    /// 与上一条通知相同，已抑制；游标照常前进
    Duplicate,
    /// 列表为空，没有新状态；游标照常前进
    NoNewStatuses,
    /// 渠道未能送达；游标不动，下一轮重试
    NotDelivered(String),
    /// 本轮失败，已走错误通道；游标不动
    Failed {
        /// 错误描述
        error: String,
        /// 错误通知是否实际送达
        notified: bool,
    },
}

/// 轮询循环独占的可变状态
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// 下一次抓取用的时间戳游标
    pub cursor: i64,
    /// 状态通知的去重门
    pub status_gate: NotificationGate,
    /// 错误通知的去重门
    pub error_gate: NotificationGate,
}

impl PollState {
    /// 从指定游标开始，两扇门都是空的
    pub fn new(cursor: i64) -> Self {
        Self {
            cursor,
            ..Default::default()
        }
    }
}

/// 状态轮询器
pub struct StatusWatcher {
    api: Arc<dyn StatusApi>,
    channel: Arc<dyn MessageChannel>,
    interval: Duration,
    state: PollState,
    /// 连续失败轮数，只用于日志
    consecutive_failures: u32,
}

impl StatusWatcher {
    /// 创建轮询器，游标从当前时间开始
    ///
    /// 只有进程启动之后更新的提交会被看到；重启后从「现在」
    /// 重新计数是刻意的简化。
    pub fn new(
        api: Arc<dyn StatusApi>,
        channel: Arc<dyn MessageChannel>,
        interval: Duration,
    ) -> Self {
        Self {
            api,
            channel,
            interval,
            state: PollState::new(Utc::now().timestamp()),
            consecutive_failures: 0,
        }
    }

    /// 覆盖起始游标（测试用）
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.state.cursor = cursor;
        self
    }

    /// 当前轮询状态
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// 永久运行：每轮之后固定休眠，成功失败都一样
    pub async fn run(&mut self) {
        info!(
            interval_secs = self.interval.as_secs(),
            cursor = self.state.cursor,
            channel = self.channel.name(),
            "Status watcher started"
        );

        loop {
            let outcome = self.poll_once().await;
            debug!(outcome = ?outcome, "Poll cycle finished");
            sleep(self.interval).await;
        }
    }

    /// 执行完整的一轮（含错误通道），永不向调用方抛错
    pub async fn poll_once(&mut self) -> CycleOutcome {
        match self.fetch_and_notify().await {
            Ok(outcome) => {
                self.consecutive_failures = 0;
                outcome
            }
            Err(e) => self.report_failure(e).await,
        }
    }

    /// 成功路径：抓取 → 校验 → 比对 → 通知
    async fn fetch_and_notify(&mut self) -> Result<CycleOutcome, CycleError> {
        debug!(cursor = self.state.cursor, "Fetching submission statuses");
        let raw = self.api.fetch(self.state.cursor).await?;
        let response = validate_response(&raw)?;

        // 列表按更新时间倒序，只看最新的一条
        let Some(latest) = response.homeworks.first() else {
            debug!(
                current_date = response.current_date,
                "No new statuses to report"
            );
            self.state.cursor = response.current_date;
            return Ok(CycleOutcome::NoNewStatuses);
        };

        let text = format_status_change(latest);

        if !self.state.status_gate.should_send(&text) {
            debug!(
                homework = %latest.homework_name,
                "Status unchanged since last notification, suppressing"
            );
            self.state.cursor = response.current_date;
            return Ok(CycleOutcome::Duplicate);
        }

        match self.channel.send(&text).await {
            SendResult::Sent => {
                info!(
                    channel = self.channel.name(),
                    homework = %latest.homework_name,
                    status = %latest.status,
                    "Status notification sent"
                );
                self.state.status_gate.record(&text);
                self.state.cursor = response.current_date;
                Ok(CycleOutcome::Notified(text))
            }
            SendResult::Skipped(reason) => {
                info!(
                    channel = self.channel.name(),
                    reason = %reason,
                    "Status notification skipped"
                );
                Ok(CycleOutcome::NotDelivered(reason))
            }
            SendResult::Failed(reason) => {
                warn!(
                    channel = self.channel.name(),
                    error = %reason,
                    "Status notification failed, will retry next cycle"
                );
                Ok(CycleOutcome::NotDelivered(reason))
            }
        }
    }

    /// 错误通道：记日志、组装错误通知、经错误门去重后尽力发送
    ///
    /// 这条路径上游标永远不前进，日志无论发送结果如何都会记。
    async fn report_failure(&mut self, error: CycleError) -> CycleOutcome {
        self.consecutive_failures += 1;
        error!(
            error = %error,
            consecutive_failures = self.consecutive_failures,
            cursor = self.state.cursor,
            "Poll cycle failed"
        );

        let text = format_failure(&error.to_string());

        if !self.state.error_gate.should_send(&text) {
            debug!("Identical failure already reported, suppressing");
            return CycleOutcome::Failed {
                error: error.to_string(),
                notified: false,
            };
        }

        let notified = match self.channel.send(&text).await {
            SendResult::Sent => {
                info!(channel = self.channel.name(), "Failure notification sent");
                self.state.error_gate.record(&text);
                true
            }
            SendResult::Skipped(reason) => {
                info!(
                    channel = self.channel.name(),
                    reason = %reason,
                    "Failure notification skipped"
                );
                false
            }
            SendResult::Failed(send_error) => {
                warn!(
                    channel = self.channel.name(),
                    error = %send_error,
                    "Failure notification could not be delivered"
                );
                false
            }
        };

        CycleOutcome::Failed {
            error: error.to_string(),
            notified,
        }
    }
}
