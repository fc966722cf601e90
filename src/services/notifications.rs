//! Notification Hub
//!
//! 사용자 대면 알림의 단일 디스패처.
//!
//! # Design Decision
//!
//! 전역 가변 상태 대신 AppState로 주입되는 명시적 허브:
//! - 고정 만료 시간(기본 5초)을 가진 큐 (조회 시점에 lazy하게 정리)
//! - tokio broadcast 채널로 /ws 스트림에 실시간 전파
//! - 전송 실패(구독자 없음)는 무시 (알림은 best effort)

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// 기본 알림 표시 시간 (ms)
pub const DEFAULT_DURATION_MS: i64 = 5000;

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

/// 사용자 대면 알림 한 건
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// 생성 시각 (epoch ms)
    pub created_at: i64,
    /// 표시 시간 (ms)
    pub duration_ms: i64,
}

impl Notification {
    fn expires_at(&self) -> i64 {
        self.created_at + self.duration_ms
    }
}

/// Notification Hub
///
/// 큐 + broadcast 팬아웃. 허브 자체는 Clone이 아니므로 Arc로 공유.
pub struct NotificationHub {
    queue: RwLock<Vec<Notification>>,
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            queue: RwLock::new(Vec::new()),
            tx,
        }
    }

    /// 알림 발송 (기본 만료 시간)
    pub async fn send(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        kind: NotificationKind,
    ) -> Notification {
        self.send_with_duration(title, body, kind, DEFAULT_DURATION_MS)
            .await
    }

    /// 알림 발송 (만료 시간 지정)
    pub async fn send_with_duration(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        kind: NotificationKind,
        duration_ms: i64,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            kind,
            created_at: Utc::now().timestamp_millis(),
            duration_ms,
        };

        {
            let mut queue = self.queue.write().await;
            queue.push(notification.clone());
        }

        // 구독자가 없어도 실패 아님
        let _ = self.tx.send(notification.clone());

        notification
    }

    /// 만료되지 않은 알림 조회 (만료분은 이때 정리)
    pub async fn active(&self) -> Vec<Notification> {
        let now = Utc::now().timestamp_millis();
        let mut queue = self.queue.write().await;
        queue.retain(|n| n.expires_at() > now);
        queue.clone()
    }

    /// 알림 수동 해제
    pub async fn dismiss(&self, id: Uuid) -> bool {
        let mut queue = self.queue.write().await;
        let before = queue.len();
        queue.retain(|n| n.id != id);
        queue.len() != before
    }

    /// 실시간 스트림 구독
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_and_active() {
        let hub = NotificationHub::new();
        hub.send("Photo Ready! 📸", "uploaded", NotificationKind::Success)
            .await;

        let active = hub.active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Photo Ready! 📸");
        assert_eq!(active[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn test_expired_notifications_are_pruned() {
        let hub = NotificationHub::new();
        // 즉시 만료
        hub.send_with_duration("gone", "x", NotificationKind::Info, 0)
            .await;
        hub.send("stays", "y", NotificationKind::Info).await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let active = hub.active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "stays");
    }

    #[tokio::test]
    async fn test_dismiss() {
        let hub = NotificationHub::new();
        let n = hub.send("a", "b", NotificationKind::Warning).await;

        assert!(hub.dismiss(n.id).await);
        assert!(!hub.dismiss(n.id).await);
        assert!(hub.active().await.is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_receives_broadcast() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();

        hub.send("live", "stream", NotificationKind::Error).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.title, "live");
        assert_eq!(received.kind, NotificationKind::Error);
    }

    #[test]
    fn test_notification_serializes_kind_as_type() {
        let n = Notification {
            id: Uuid::nil(),
            title: "t".to_string(),
            body: "b".to_string(),
            kind: NotificationKind::Success,
            created_at: 0,
            duration_ms: 5000,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["durationMs"], 5000);
    }
}
