//! Submission Workflow Endpoints
//!
//! 4단계 제출 워크플로우(select → photo → confirm → submit)의 HTTP 표면.
//! 실제 트랜잭션 서명/전송은 외부 지갑 콜라보레이터가 수행하고,
//! 그 결과는 `/complete` 콜백으로 돌아온다.
//!
//! # Flow
//!
//! ```text
//! POST /submissions                  세션 시작 (select)
//! POST /submissions/:id/action      액션 선택 → photo
//! POST /submissions/:id/photo      사진 업로드 → confirm
//! POST /submissions/:id/confirm    확인 → submit (call + proof 반환)
//! POST /submissions/:id/complete   지갑 콜백 (성공 → 세션 종료)
//! POST /submissions/:id/back       한 단계 뒤로
//! DELETE /submissions/:id          폐기
//! ```

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::photos::{notify_upload_outcome, read_photo_field};
use crate::services::contract::{find_action, CallRequest, EcoAction};
use crate::services::ipfs::PhotoMetadata;
use crate::services::notifications::NotificationKind;
use crate::services::photo::validate_photo_file;
use crate::services::proof::generate_proof_metadata;
use crate::services::submission::{SubmissionEvent, SubmissionSession, SubmissionStep};
use crate::types::EthAddress;
use crate::AppState;

// ============ Request/Response Types ============

/// 세션 시작 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSubmissionRequest {
    /// 제출자 지갑 주소
    pub user_address: String,
}

/// 액션 선택 요청
#[derive(Debug, Deserialize)]
pub struct SelectActionRequest {
    /// 카탈로그 액션 이름
    pub action: String,
}

/// 지갑 콜라보레이터 결과 콜백
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub success: bool,
    /// 성공 시 트랜잭션 해시 (로깅용)
    pub tx_hash: Option<String>,
    /// 실패 시 에러 메시지
    pub error: Option<String>,
}

/// 세션 상태 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub user_address: String,
    pub step: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static EcoAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoMetadata>,
    /// 사진 미리보기 URL (로컬 fingerprint는 placeholder)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<CallRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 완료 콜백 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    /// true면 세션이 초기화/종료됨
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionResponse>,
}

fn session_response(state: &AppState, session: SubmissionSession) -> SessionResponse {
    let (action, photo, call, proof) = match &session.step {
        SubmissionStep::Select => (None, None, None, None),
        SubmissionStep::Photo { action } => (Some(*action), None, None, None),
        SubmissionStep::Confirm { action, photo } => {
            (Some(*action), Some(photo.clone()), None, None)
        }
        SubmissionStep::Submit {
            action,
            photo,
            call,
            proof,
        } => (
            Some(*action),
            Some(photo.clone()),
            Some(call.clone()),
            Some(proof.clone()),
        ),
    };

    let photo_url = photo
        .as_ref()
        .map(|p: &PhotoMetadata| state.ipfs.get_ipfs_url(&p.hash));

    SessionResponse {
        id: session.id,
        user_address: session.user_address,
        step: session.step.name(),
        action,
        photo,
        photo_url,
        call,
        proof,
        created_at: session.created_at,
        updated_at: session.updated_at,
    }
}

// ============ Handlers ============

/// POST /submissions
///
/// 새 제출 세션 시작 (select 단계)
pub async fn open_submission(
    State(state): State<AppState>,
    Json(req): Json<OpenSubmissionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let address = EthAddress::new(&req.user_address).map_err(ApiError::ValidationError)?;

    let session = state.submissions.open(address.to_string()).await;
    tracing::info!("Submission session {} opened for {}", session.id, address);

    Ok(Json(session_response(&state, session)))
}

/// GET /submissions/:id
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .submissions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Submission session".to_string()))?;

    Ok(Json(session_response(&state, session)))
}

/// POST /submissions/:id/action
///
/// 카탈로그 액션 선택 → photo 단계
pub async fn select_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectActionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let action = find_action(&req.action)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown action: {}", req.action)))?;

    let session = state
        .submissions
        .apply_event(id, SubmissionEvent::SelectAction(action))
        .await?
        .ok_or(ApiError::InternalError)?;

    Ok(Json(session_response(&state, session)))
}

/// POST /submissions/:id/photo
///
/// 증빙 사진 업로드 → confirm 단계
///
/// # Flow
///
/// 1. 검증 실패 → 400, photo 단계 유지
/// 2. 업로드 실패 → 502, photo 단계 유지
/// 3. 업로드 성공 → confirm 전진
pub async fn attach_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionResponse>, ApiError> {
    // 세션과 단계를 먼저 확인해 불필요한 업로드를 피한다
    let session = state
        .submissions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Submission session".to_string()))?;
    if !matches!(session.step, SubmissionStep::Photo { .. }) {
        return Err(ApiError::InvalidTransition(format!(
            "Cannot attach photo from step '{}'",
            session.step.name()
        )));
    }

    let file = read_photo_field(&mut multipart).await?;

    if let Err(err) = validate_photo_file(&file) {
        state
            .notifications
            .send("Invalid File", err.to_string(), NotificationKind::Error)
            .await;
        return Err(ApiError::ValidationError(err.to_string()));
    }

    let result = state.ipfs.upload_to_ipfs(&file).await;
    notify_upload_outcome(&state, &result).await;

    let session = state.submissions.attach_upload(id, &result).await?;
    Ok(Json(session_response(&state, session)))
}

/// POST /submissions/:id/confirm
///
/// 확인 → submit 단계. 인코딩된 호출과 proof metadata를 돌려준다.
/// proof는 호출 payload에 실리지 않는다. 호출 인자는
/// (actionType, photoHash) 뿐이다.
pub async fn confirm_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .submissions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Submission session".to_string()))?;

    let (action, photo) = match &session.step {
        SubmissionStep::Confirm { action, photo } => (*action, photo.clone()),
        other => {
            return Err(ApiError::InvalidTransition(format!(
                "Cannot confirm from step '{}'",
                other.name()
            )))
        }
    };

    let proof = generate_proof_metadata(&photo, action.name, &session.user_address)?;

    let call = state
        .contract
        .log_action_call(action.name, &photo.hash)
        .map_err(|err| {
            tracing::error!("Failed to build logAction call: {:?}", err);
            ApiError::ServiceUnavailable("Contract".to_string())
        })?;

    let session = state
        .submissions
        .apply_event(id, SubmissionEvent::ConfirmSubmission { call, proof })
        .await?
        .ok_or(ApiError::InternalError)?;

    Ok(Json(session_response(&state, session)))
}

/// POST /submissions/:id/back
pub async fn go_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .submissions
        .apply_event(id, SubmissionEvent::Back)
        .await?
        .ok_or(ApiError::InternalError)?;

    Ok(Json(session_response(&state, session)))
}

/// POST /submissions/:id/complete
///
/// 외부 지갑 콜라보레이터의 성공/실패 콜백.
/// 성공이면 세션이 초기화/종료되고, 실패면 submit 단계가 유지된다.
/// 롤백은 없음 (로컬에 커밋된 상태가 없다).
pub async fn complete_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, ApiError> {
    // 성공 알림에 넣을 액션 정보를 종료 전에 읽어 둔다
    let session = state
        .submissions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Submission session".to_string()))?;
    let action = match &session.step {
        SubmissionStep::Submit { action, .. } => Some(*action),
        _ => None,
    };

    if req.success {
        let closed = state
            .submissions
            .apply_event(id, SubmissionEvent::TransactionSucceeded)
            .await?;

        if let Some(tx_hash) = &req.tx_hash {
            tracing::info!("Eco-action transaction confirmed: {}", tx_hash);
        }

        let (points, name) = action.map(|a| (a.points, a.name)).unwrap_or((0, ""));
        state
            .notifications
            .send(
                "🎉 Eco-Action Logged Successfully!",
                format!(
                    "You earned {} points for {}. Keep saving the planet!",
                    points, name
                ),
                NotificationKind::Success,
            )
            .await;

        Ok(Json(CompleteResponse {
            closed: closed.is_none(),
            session: closed.map(|s| session_response(&state, s)),
        }))
    } else {
        let error = req.error.unwrap_or_else(|| "Transaction failed".to_string());
        tracing::error!("Transaction error: {}", error);

        let session = state
            .submissions
            .apply_event(id, SubmissionEvent::TransactionFailed(error))
            .await?
            .ok_or(ApiError::InternalError)?;

        state
            .notifications
            .send(
                "Transaction Failed",
                "Failed to log eco-action. Please try again.",
                NotificationKind::Error,
            )
            .await;

        Ok(Json(CompleteResponse {
            closed: false,
            session: Some(session_response(&state, session)),
        }))
    }
}

/// DELETE /submissions/:id
///
/// 세션 폐기: 선택/미리보기/fingerprint 등 진행 상태 전부 버림
pub async fn discard_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.submissions.discard(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Submission session".to_string()))
    }
}
