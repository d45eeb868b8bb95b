//! 通知去重门
//!
//! 抑制与上一条成功发送完全相同的消息，判定就是严格的
//! 字符串相等。状态通知和错误通知各持有一个独立实例，
//! 互不干扰。只有确认送达的消息才写入记录：发送失败时
//! 门保持打开，下一轮会重试同一条消息。

/// 通知去重门
#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    /// 上一条成功发送的消息
    last_sent: Option<String>,
}

impl NotificationGate {
    /// 创建空门，首条消息总是放行
    pub fn new() -> Self {
        Self { last_sent: None }
    }

    /// 候选消息是否应该发送
    pub fn should_send(&self, candidate: &str) -> bool {
        self.last_sent.as_deref() != Some(candidate)
    }

    /// 记录一条已确认送达的消息
    pub fn record(&mut self, sent: impl Into<String>) {
        self.last_sent = Some(sent.into());
    }

    /// 上一条已发送的消息
    pub fn last_sent(&self) -> Option<&str> {
        self.last_sent.as_deref()
    }
}
