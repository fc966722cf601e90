//! Photo Upload Endpoints
//!
//! 업로드 파이프라인(검증 → 압축 → 위치 → pin/fingerprint)의 HTTP 표면.
//!
//! # Endpoints
//! - `POST /photos` - 단일 업로드
//! - `POST /photos/batch` - 복수 업로드 (순서 유지)
//! - `GET /photos/:hash/url` - fingerprint → 표시 URL

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::services::ipfs::UploadResult;
use crate::services::notifications::NotificationKind;
use crate::services::photo::{validate_photo_file, PhotoFile};
use crate::AppState;

// ============ Request/Response Types ============

/// URL 해석 응답
#[derive(Debug, Serialize)]
pub struct PhotoUrlResponse {
    pub hash: String,
    pub url: String,
}

// ============ Handlers ============

/// POST /photos
///
/// multipart `file` 필드 하나를 받아 파이프라인 전체를 수행
///
/// # Flow
///
/// 1. 검증 실패 → 400 (에러 메시지 그대로 노출)
/// 2. 업로드 결과는 성공/실패 모두 UploadResult로 반환
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, ApiError> {
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

    Ok(Json(result))
}

/// POST /photos/batch
///
/// 여러 `file` 필드를 받아 동시 업로드, 입력 순서대로 결과 반환
pub async fn upload_photos_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<UploadResult>>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().unwrap_or("photo").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?.to_vec();
        files.push(PhotoFile::new(data, file_name, content_type));
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No files in request".to_string()));
    }

    // 검증은 파일별로, 실패는 해당 항목 결과로만 기록
    let mut results: Vec<Option<UploadResult>> = vec![None; files.len()];
    let mut to_upload = Vec::new();
    for (i, file) in files.iter().enumerate() {
        match validate_photo_file(file) {
            Ok(()) => to_upload.push(i),
            Err(err) => {
                results[i] = Some(UploadResult {
                    success: false,
                    hash: None,
                    error: Some(err.to_string()),
                    metadata: None,
                });
            }
        }
    }

    let valid_files: Vec<PhotoFile> = to_upload.iter().map(|&i| files[i].clone()).collect();
    let uploaded = state.ipfs.batch_upload(&valid_files).await;
    for (&i, result) in to_upload.iter().zip(uploaded) {
        results[i] = Some(result);
    }

    Ok(Json(results.into_iter().flatten().collect()))
}

/// GET /photos/:hash/url
///
/// fingerprint를 표시 가능한 URL로 해석
/// (`local_` 접두사는 placeholder data URI)
pub async fn resolve_photo_url(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Json<PhotoUrlResponse> {
    let url = state.ipfs.get_ipfs_url(&hash);
    Json(PhotoUrlResponse { hash, url })
}

// ============ Helpers ============

/// multipart에서 `file` 필드 추출
pub(crate) async fn read_photo_field(multipart: &mut Multipart) -> Result<PhotoFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let file_name = field.file_name().unwrap_or("photo").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?.to_vec();

        return Ok(PhotoFile::new(data, file_name, content_type));
    }

    Err(ApiError::BadRequest(
        "Missing 'file' field in multipart body".to_string(),
    ))
}

/// 업로드 결과에 맞는 알림 발송
pub(crate) async fn notify_upload_outcome(state: &AppState, result: &UploadResult) {
    if result.success {
        let body = match result.hash.as_deref() {
            Some(hash) if hash.starts_with(crate::services::ipfs::LOCAL_HASH_PREFIX) => {
                "Photo processed for demo (IPFS integration available)"
            }
            _ => "Photo uploaded to IPFS and ready for blockchain submission.",
        };
        state
            .notifications
            .send("Photo Ready! 📸", body, NotificationKind::Success)
            .await;
    } else {
        state
            .notifications
            .send(
                "Upload Error",
                "Failed to process photo. Please try again.",
                NotificationKind::Error,
            )
            .await;
    }
}
