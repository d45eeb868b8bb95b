//! 评审状态与结论文案的映射
//!
//! 映射表是唯一事实来源：校验器用它判断状态是否合法，
//! 格式化器用它生成通知正文。文案与被监控平台保持同一语言。

/// 已通过评审
pub const VERDICT_APPROVED: &str = "Работа проверена: ревьюеру всё понравилось. Ура!";

/// 评审进行中
pub const VERDICT_REVIEWING: &str = "Работа взята на проверку ревьюером.";

/// 评审有修改意见
pub const VERDICT_REJECTED: &str = "Работа проверена: у ревьюера есть замечания.";

/// 未知状态的兜底文案，避免静默返回空字符串
pub const VERDICT_UNRECOGNIZED: &str = "Статус проверки не распознан.";

/// 状态到结论的静态映射表
const VERDICTS: [(&str, &str); 3] = [
    ("approved", VERDICT_APPROVED),
    ("reviewing", VERDICT_REVIEWING),
    ("rejected", VERDICT_REJECTED),
];

/// 查询状态对应的结论文案
pub fn verdict_for(status: &str) -> Option<&'static str> {
    VERDICTS
        .iter()
        .find(|(known, _)| *known == status)
        .map(|(_, verdict)| *verdict)
}

/// 查询结论文案，未知状态返回兜底文案而不是空字符串
pub fn verdict_text(status: &str) -> &'static str {
    verdict_for(status).unwrap_or(VERDICT_UNRECOGNIZED)
}

/// 状态是否在已知集合内
pub fn is_known_status(status: &str) -> bool {
    verdict_for(status).is_some()
}
