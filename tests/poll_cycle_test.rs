//! 轮询循环的行为测试
//!
//! 用脚本化的 API 替身和记录型渠道替身驱动 `StatusWatcher`，
//! 覆盖游标推进、去重门和错误通道的组合行为。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use homework_monitor::{
    ApiError, CycleOutcome, MessageChannel, SendResult, StatusApi, StatusWatcher,
};

/// 按脚本依次返回响应的 API 替身，并记录每次请求的 from_date
struct ScriptedApi {
    responses: Mutex<VecDeque<Result<Value, ApiError>>>,
    calls: Mutex<Vec<i64>>,
}

impl ScriptedApi {
    fn new(responses: Vec<Result<Value, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusApi for ScriptedApi {
    async fn fetch(&self, from_date: i64) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(from_date);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("script exhausted".to_string())))
    }
}

/// 记录发送内容的渠道替身，可以让前 N 次发送失败
struct RecordingChannel {
    sent: Mutex<Vec<String>>,
    fail_next: AtomicUsize,
    send_count: AtomicUsize,
}

impl RecordingChannel {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_next: AtomicUsize::new(0),
            send_count: AtomicUsize::new(0),
        }
    }

    fn failing(times: usize) -> Self {
        let channel = Self::new();
        channel.fail_next.store(times, Ordering::SeqCst);
        channel
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn send_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> SendResult {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return SendResult::Failed("simulated outage".to_string());
        }
        self.sent.lock().unwrap().push(text.to_string());
        SendResult::Sent
    }
}

fn submission(id: i64, status: &str, name: &str) -> Value {
    json!({
        "id": id,
        "status": status,
        "homework_name": name,
        "reviewer_comment": "",
        "date_updated": "2020-02-13T14:40:57Z",
        "lesson_name": "Sprint 1",
    })
}

fn response(homeworks: Vec<Value>, current_date: i64) -> Result<Value, ApiError> {
    Ok(json!({ "homeworks": homeworks, "current_date": current_date }))
}

fn make_watcher(
    api: Arc<ScriptedApi>,
    channel: Arc<RecordingChannel>,
    cursor: i64,
) -> StatusWatcher {
    StatusWatcher::new(api, channel, Duration::from_secs(1)).with_cursor(cursor)
}

#[tokio::test]
async fn test_changed_status_triggers_exactly_one_new_send() {
    // Given: 第一轮 reviewing，第二轮同一作业变成 approved
    let api = Arc::new(ScriptedApi::new(vec![
        response(vec![submission(1, "reviewing", "username__hw_oop")], 1000),
        response(vec![submission(1, "approved", "username__hw_oop")], 2000),
    ]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    let first = watcher.poll_once().await;
    let second = watcher.poll_once().await;

    // Then: 两条不同的通知，游标最终在 2000
    assert!(matches!(first, CycleOutcome::Notified(_)));
    assert!(matches!(second, CycleOutcome::Notified(_)));
    let sent = channel.sent();
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[0], sent[1]);
    assert!(sent[0].contains("Работа взята на проверку"));
    assert!(sent[1].contains("Ура"));
    assert_eq!(watcher.state().cursor, 2000);
    // 游标逐轮推进
    assert_eq!(api.calls(), vec![500, 1000]);
}

#[tokio::test]
async fn test_unchanged_status_is_suppressed_but_cursor_advances() {
    // Given: 两轮返回完全相同的状态
    let api = Arc::new(ScriptedApi::new(vec![
        response(vec![submission(1, "reviewing", "parser")], 1000),
        response(vec![submission(1, "reviewing", "parser")], 1100),
    ]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    let first = watcher.poll_once().await;
    let second = watcher.poll_once().await;

    // Then: 只发送一次，第二轮被抑制但游标照常前进
    assert!(matches!(first, CycleOutcome::Notified(_)));
    assert_eq!(second, CycleOutcome::Duplicate);
    assert_eq!(channel.send_count(), 1);
    assert_eq!(watcher.state().cursor, 1100);
}

#[tokio::test]
async fn test_empty_list_advances_cursor_without_sending() {
    // Given: {"homeworks": [], "current_date": 1500}
    let api = Arc::new(ScriptedApi::new(vec![response(vec![], 1500)]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    let outcome = watcher.poll_once().await;

    // Then: 零发送，游标推进到 1500
    assert_eq!(outcome, CycleOutcome::NoNewStatuses);
    assert_eq!(channel.send_count(), 0);
    assert_eq!(watcher.state().cursor, 1500);
}

#[tokio::test]
async fn test_missing_homeworks_key_reports_error_once_and_keeps_cursor() {
    // Given: 连续两轮响应都缺 homeworks 键
    let api = Arc::new(ScriptedApi::new(vec![
        Ok(json!({ "current_date": 9000 })),
        Ok(json!({ "current_date": 9000 })),
    ]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    let first = watcher.poll_once().await;
    let second = watcher.poll_once().await;

    // Then: 错误通知发一次，第二轮被错误门抑制；游标不动，重试同一时间戳
    assert!(matches!(first, CycleOutcome::Failed { notified: true, .. }));
    assert!(matches!(
        second,
        CycleOutcome::Failed {
            notified: false,
            ..
        }
    ));
    assert_eq!(channel.send_count(), 1);
    assert!(channel.sent()[0].starts_with("Сбой в работе программы:"));
    assert!(channel.sent()[0].contains("homeworks"));
    assert_eq!(watcher.state().cursor, 500);
    assert_eq!(api.calls(), vec![500, 500]);
}

#[tokio::test]
async fn test_distinct_errors_are_both_reported() {
    // Given: 两轮失败，错误描述不同
    let api = Arc::new(ScriptedApi::new(vec![
        Err(ApiError::Transport("connection refused".to_string())),
        Err(ApiError::InvalidResponseCode {
            code: 503,
            reason: "Service Unavailable".to_string(),
            body: "maintenance".to_string(),
        }),
    ]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    watcher.poll_once().await;
    watcher.poll_once().await;

    // Then: 去重按字符串相等判定，描述不同就都发送
    assert_eq!(channel.send_count(), 2);
    assert_ne!(channel.sent()[0], channel.sent()[1]);
    assert_eq!(watcher.state().cursor, 500);
}

#[tokio::test]
async fn test_send_failure_keeps_cursor_and_retries_same_message() {
    // Given: 渠道第一次发送故障，之后恢复
    let api = Arc::new(ScriptedApi::new(vec![
        response(vec![submission(1, "approved", "parser")], 1200),
        response(vec![submission(1, "approved", "parser")], 1300),
    ]));
    let channel = Arc::new(RecordingChannel::failing(1));
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When: 第一轮送达失败
    let first = watcher.poll_once().await;

    // Then: 游标不动，门保持打开
    assert!(matches!(first, CycleOutcome::NotDelivered(_)));
    assert_eq!(watcher.state().cursor, 500);

    // When: 第二轮重新抓取同一时间戳并重试
    let second = watcher.poll_once().await;

    // Then: 同一条消息送达后游标才前进
    assert!(matches!(second, CycleOutcome::Notified(_)));
    assert_eq!(watcher.state().cursor, 1300);
    assert_eq!(api.calls(), vec![500, 500]);
    assert_eq!(channel.send_count(), 2);
    assert_eq!(channel.sent().len(), 1);
}

#[tokio::test]
async fn test_only_most_recent_submission_is_reported() {
    // Given: 列表有两条（倒序，最新在前）
    let api = Arc::new(ScriptedApi::new(vec![response(
        vec![
            submission(2, "approved", "newest_hw"),
            submission(1, "rejected", "older_hw"),
        ],
        2500,
    )]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    watcher.poll_once().await;

    // Then: 只通知第一条
    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("newest_hw"));
    assert!(!sent[0].contains("older_hw"));
    assert_eq!(watcher.state().cursor, 2500);
}

#[tokio::test]
async fn test_validation_failure_then_recovery() {
    // Given: 第一轮 homeworks 类型不对，第二轮恢复正常
    let api = Arc::new(ScriptedApi::new(vec![
        Ok(json!({ "homeworks": "not a list", "current_date": 100 })),
        response(vec![submission(1, "reviewing", "codec")], 3000),
    ]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    let first = watcher.poll_once().await;
    let second = watcher.poll_once().await;

    // Then: 错误轮不吞掉游标，恢复后状态通知照常发出
    assert!(matches!(first, CycleOutcome::Failed { notified: true, .. }));
    assert!(matches!(second, CycleOutcome::Notified(_)));
    assert_eq!(api.calls(), vec![500, 500]);
    assert_eq!(watcher.state().cursor, 3000);
    assert_eq!(channel.send_count(), 2);
}

#[tokio::test]
async fn test_unknown_status_goes_through_error_channel() {
    // Given: 响应里带着没见过的状态
    let api = Arc::new(ScriptedApi::new(vec![response(
        vec![submission(1, "paused", "parser")],
        1800,
    )]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    let outcome = watcher.poll_once().await;

    // Then: 整个响应被拒绝，错误通知里带着状态名，游标不动
    assert!(matches!(outcome, CycleOutcome::Failed { notified: true, .. }));
    assert!(channel.sent()[0].contains("paused"));
    assert_eq!(watcher.state().cursor, 500);
}

#[tokio::test]
async fn test_error_gate_does_not_block_status_notifications() {
    // Given: 失败一轮之后恢复，再失败同样的错误
    let api = Arc::new(ScriptedApi::new(vec![
        Ok(json!({ "current_date": 1 })),
        response(vec![submission(1, "approved", "parser")], 2000),
        Ok(json!({ "current_date": 1 })),
    ]));
    let channel = Arc::new(RecordingChannel::new());
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    watcher.poll_once().await;
    let recovered = watcher.poll_once().await;
    let repeated = watcher.poll_once().await;

    // Then: 状态门与错误门互不影响；中间的成功轮不清空错误门，
    // 第三轮的同样错误仍被抑制
    assert!(matches!(recovered, CycleOutcome::Notified(_)));
    assert!(matches!(
        repeated,
        CycleOutcome::Failed {
            notified: false,
            ..
        }
    ));
    assert_eq!(channel.send_count(), 2);
}

#[tokio::test]
async fn test_failed_error_notification_is_retried_next_time() {
    // Given: 错误通知本身发送失败，下一轮同样的错误
    let api = Arc::new(ScriptedApi::new(vec![
        Ok(json!({ "current_date": 9000 })),
        Ok(json!({ "current_date": 9000 })),
    ]));
    let channel = Arc::new(RecordingChannel::failing(1));
    let mut watcher = make_watcher(api.clone(), channel.clone(), 500);

    // When
    let first = watcher.poll_once().await;
    let second = watcher.poll_once().await;

    // Then: 失败的发送不写入错误门，第二轮重试并送达
    assert!(matches!(
        first,
        CycleOutcome::Failed {
            notified: false,
            ..
        }
    ));
    assert!(matches!(second, CycleOutcome::Failed { notified: true, .. }));
    assert_eq!(channel.send_count(), 2);
    assert_eq!(channel.sent().len(), 1);
}
