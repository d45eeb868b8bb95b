//! 消息渠道抽象

use async_trait::async_trait;

/// 发送结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    /// 渠道确认送达
    Sent,
    /// 本次发送被跳过（如 dry-run 模式）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

impl SendResult {
    /// 是否确认送达
    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent)
    }
}

/// 消息渠道 trait
///
/// `send` 永远不向调用方抛致命错误：网络故障、认证失败、
/// 对端拒绝都折叠为 [`SendResult::Failed`]，由轮询循环决定
/// 下一轮是否重试。
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 发送一条文本消息
    async fn send(&self, text: &str) -> SendResult;
}
