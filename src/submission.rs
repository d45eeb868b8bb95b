//! 作业提交的数据模型
//!
//! 这里只定义已通过结构校验的类型；原始响应先经过
//! `validator::validate_response` 再落到这些结构上。

use serde::{Deserialize, Serialize};

/// 单个作业提交的当前评审状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// 提交 ID
    pub id: i64,
    /// 评审状态（approved / reviewing / rejected）
    pub status: String,
    /// 作业名称
    pub homework_name: String,
    /// 评审意见，可为空字符串
    pub reviewer_comment: String,
    /// 状态更新时间
    pub date_updated: String,
    /// 所属课程
    pub lesson_name: String,
}

/// 状态 API 的完整响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    /// 提交列表，按更新时间倒序，最新的一条在开头
    pub homeworks: Vec<Submission>,
    /// 服务端时间戳，作为下一轮抓取的游标
    pub current_date: i64,
}
