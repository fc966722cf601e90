//! Health Check Endpoint
//!
//! # Interview Q&A
//!
//! Q: Health check 엔드포인트는 왜 필요한가?
//! A: 3가지 용도
//!    1. 로드밸런서 헬스체크 (ALB, nginx)
//!    2. Kubernetes liveness/readiness probe
//!    3. 모니터링 시스템 연동 (Prometheus, Datadog)
//!
//! Q: 이 서비스는 무엇을 "깊게" 체크하는가?
//! A: 외부 의존성이 전부 옵션이라 연결 테스트 대신 구성 상태를 노출
//!    - pinning 자격증명 유무 (없으면 로컬 fingerprint 모드)
//!    - 컨트랙트 주소 유무 (없으면 demo 통계만)
//!    - 통계 제공자 모드 (demo | live)

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::StatsMode;
use crate::AppState;

/// Health check 응답
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Pinata 자격증명이 설정되어 있는지
    pub pinning_configured: bool,
    /// 컨트랙트 주소가 설정되어 있는지
    pub contract_configured: bool,
    /// 통계 제공자 모드
    pub stats_mode: String,
    pub timestamp: String,
}

/// GET /health
///
/// 서버 및 구성 상태 확인
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats_mode = match state.config.stats_mode {
        StatsMode::Demo => "demo",
        StatsMode::Live => "live",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pinning_configured: state.config.pinning_configured(),
        contract_configured: state.contract.is_configured(),
        stats_mode: stats_mode.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
