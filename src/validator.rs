//! 响应结构校验
//!
//! 外部 API 的响应在使用前必须整体通过校验；任何一项检查失败
//! 都会拒绝整个响应，不接受部分合法的结果。检查按固定顺序
//! 快速失败，错误里带上第一个出问题的位置。

use serde_json::Value;
use thiserror::Error;

use crate::submission::PollResponse;
use crate::verdict::is_known_status;

/// 每条提交记录必须恰好包含的字段集合
const SUBMISSION_FIELDS: [&str; 6] = [
    "id",
    "status",
    "homework_name",
    "reviewer_comment",
    "date_updated",
    "lesson_name",
];

/// 响应结构错误，全部视为瞬态（下一轮重试同一时间戳）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 顶层不是 JSON 对象
    #[error("response payload is not a JSON object")]
    MalformedPayload,
    /// 顶层缺少必需字段
    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),
    /// 顶层字段类型不符
    #[error("response field `{0}` has the wrong type")]
    WrongType(&'static str),
    /// 提交记录的结构不符合约定
    #[error("submission entry has an unexpected shape: {0}")]
    MalformedSubmission(String),
    /// 提交记录带有未知的评审状态
    #[error("unknown submission status `{0}`")]
    UnknownStatus(String),
}

/// 校验原始响应并解析为 [`PollResponse`]
///
/// 检查顺序固定：
/// 1. 顶层是对象
/// 2. `homeworks` 存在
/// 3. `homeworks` 是数组
/// 4. `current_date` 存在且为整数
/// 5. 每条提交恰好包含六个约定字段，多一个少一个都不行
/// 6. 每条提交的 `status` 在已知集合内
///
/// 顶层多出的字段不影响校验结果。
pub fn validate_response(raw: &Value) -> Result<PollResponse, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::MalformedPayload)?;

    let homeworks = object
        .get("homeworks")
        .ok_or(ValidationError::MissingField("homeworks"))?;
    let entries = homeworks
        .as_array()
        .ok_or(ValidationError::WrongType("homeworks"))?;

    let current_date = object
        .get("current_date")
        .ok_or(ValidationError::MissingField("current_date"))?;
    if !current_date.is_i64() && !current_date.is_u64() {
        return Err(ValidationError::WrongType("current_date"));
    }

    for entry in entries {
        validate_entry(entry)?;
    }

    serde_json::from_value(raw.clone())
        .map_err(|e| ValidationError::MalformedSubmission(e.to_string()))
}

/// 校验单条提交记录的字段集合与状态值
fn validate_entry(entry: &Value) -> Result<(), ValidationError> {
    let fields = entry.as_object().ok_or_else(|| {
        ValidationError::MalformedSubmission("entry is not a JSON object".to_string())
    })?;

    for required in SUBMISSION_FIELDS {
        if !fields.contains_key(required) {
            return Err(ValidationError::MalformedSubmission(format!(
                "missing field `{}`",
                required
            )));
        }
    }
    if fields.len() != SUBMISSION_FIELDS.len() {
        let unexpected = fields
            .keys()
            .find(|key| !SUBMISSION_FIELDS.contains(&key.as_str()))
            .cloned()
            .unwrap_or_default();
        return Err(ValidationError::MalformedSubmission(format!(
            "unexpected field `{}`",
            unexpected
        )));
    }

    let status = fields.get("status").unwrap_or(&Value::Null);
    let known = status.as_str().map(is_known_status).unwrap_or(false);
    if !known {
        let shown = status
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());
        return Err(ValidationError::UnknownStatus(shown));
    }

    Ok(())
}
