//! WebSocket Routes
//!
//! 알림 실시간 스트리밍 WebSocket 엔드포인트
//!
//! # Endpoints
//! - `GET /ws` - 알림 스트림 연결
//!
//! 연결 직후 아직 만료되지 않은 큐 내용을 내려보내고, 이후
//! 허브 broadcast를 구독해 새 알림을 실시간으로 전달한다.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};

use crate::AppState;

/// WebSocket 업그레이드 핸들러
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// WebSocket 연결 처리
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // 구독을 먼저 걸어 초기 전송 중 발생하는 알림 유실을 막는다
    let mut rx = state.notifications.subscribe();

    // 아직 살아있는 큐 내용 전송
    for notification in state.notifications.active().await {
        if let Ok(json) = serde_json::to_string(&notification) {
            if sender.send(Message::Text(json)).await.is_err() {
                return;
            }
        }
    }

    // 수신 태스크: 클라이언트 종료 감지용
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    // 송신 태스크: broadcast → 소켓
    let send_task = tokio::spawn(async move {
        while let Ok(notification) = rx.recv().await {
            match serde_json::to_string(&notification) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("Failed to serialize notification: {}", err);
                }
            }
        }
    });

    // 연결이 종료될 때까지 대기
    tokio::select! {
        _ = recv_task => {}
        _ = send_task => {}
    }
}
