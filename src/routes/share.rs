//! Share Endpoints
//!
//! 소셜 공유 메시지 구성. 실제 게시는 클라이언트가 반환된 링크로
//! 수행하고, copy 플랫폼은 메시지 본문만 돌려받는다.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::notifications::NotificationKind;
use crate::services::share::{
    compose_message, share_link, template_infos, ShareData, ShareTemplateInfo, APP_URL,
};
use crate::types::EthAddress;
use crate::AppState;

// ============ Request/Response Types ============

/// 템플릿 목록 응답
#[derive(Debug, Serialize)]
pub struct ShareTemplatesResponse {
    pub templates: Vec<ShareTemplateInfo>,
}

/// 메시지 구성 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    pub user_address: String,
    /// 템플릿 id (points, actions, rank, impact, community, milestone)
    pub template: String,
    /// 있으면 템플릿 대신 사용
    pub custom_message: Option<String>,
    /// twitter | facebook | linkedin | copy
    pub platform: String,
}

/// 메시지 구성 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
    pub message: String,
    /// copy 플랫폼이면 None이며 클라이언트가 message + appUrl을 복사
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    pub app_url: &'static str,
}

// ============ Handlers ============

/// GET /share/templates
pub async fn list_templates() -> Json<ShareTemplatesResponse> {
    Json(ShareTemplatesResponse {
        templates: template_infos(),
    })
}

/// POST /share/compose
///
/// 사용자 통계를 템플릿에 채워 메시지와 플랫폼 링크를 만든다
pub async fn compose(
    State(state): State<AppState>,
    Json(req): Json<ComposeRequest>,
) -> Result<Json<ComposeResponse>, ApiError> {
    let address = EthAddress::new(&req.user_address).map_err(ApiError::ValidationError)?;

    let stats = state
        .stats
        .user_stats(address.as_str())
        .await
        .map_err(|err| {
            tracing::error!("user_stats failed: {:?}", err);
            ApiError::ServiceUnavailable("Stats provider".to_string())
        })?;

    let data = ShareData::from_stats(&stats, address.short());

    let message = compose_message(&req.template, req.custom_message.as_deref(), &data)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown template: {}", req.template)))?;

    let share_url = match req.platform.as_str() {
        "copy" => {
            state
                .notifications
                .send(
                    "Copied!",
                    "Share message copied to clipboard",
                    NotificationKind::Success,
                )
                .await;
            None
        }
        platform => {
            let url = share_link(platform, &message)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown platform: {}", platform)))?;
            state
                .notifications
                .send(
                    "Shared Successfully! 🎉",
                    "Thank you for spreading the eco-love!",
                    NotificationKind::Success,
                )
                .await;
            Some(url)
        }
    };

    Ok(Json(ComposeResponse {
        message,
        share_url,
        app_url: APP_URL,
    }))
}
