//! 通知文案组装
//!
//! 所有用户可见的固定文案集中在 [`msg`] 模块，模板与被监控
//! 平台保持同一语言。两个组装函数都是纯函数：同样的输入
//! 永远产出同一个字符串，去重门的比较才有意义。

use crate::submission::Submission;
use crate::verdict::verdict_text;

/// Notification message constants (Russian)
pub mod msg {
    /// 状态变更通知的前缀
    pub const STATUS_CHANGED: &str = "Изменился статус проверки работы";

    /// 程序异常通知的前缀
    pub const PROGRAM_FAILURE: &str = "Сбой в работе программы:";
}

/// 组装状态变更通知
pub fn format_status_change(submission: &Submission) -> String {
    format!(
        "{} \"{}\". {}",
        msg::STATUS_CHANGED,
        submission.homework_name,
        verdict_text(&submission.status)
    )
}

/// 组装轮询异常通知
pub fn format_failure(description: &str) -> String {
    format!("{} {}", msg::PROGRAM_FAILURE, description)
}
