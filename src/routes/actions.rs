//! Action Catalog Endpoint

use axum::Json;
use serde::Serialize;

use crate::services::contract::{EcoAction, ECO_ACTIONS};

/// 카탈로그 응답
#[derive(Debug, Serialize)]
pub struct ActionCatalogResponse {
    pub actions: Vec<EcoAction>,
}

/// GET /actions
///
/// 로깅 가능한 액션 목록 (이름, 포인트, 아이콘)
pub async fn list_actions() -> Json<ActionCatalogResponse> {
    Json(ActionCatalogResponse {
        actions: ECO_ACTIONS.to_vec(),
    })
}
