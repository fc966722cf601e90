//! Stats Endpoints
//!
//! 대시보드/커뮤니티 위젯용 집계 조회. 데이터 소스는 설정된
//! StatsProvider(demo 또는 live)가 결정한다.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::stats::{
    GlobalStats, ImpactMetric, LeaderboardEntry, LoggedAction, RegionStats, TimelinePoint,
    UserStats,
};
use crate::types::EthAddress;
use crate::AppState;

// ============ Request/Response Types ============

/// 히스토리 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct ActionsQuery {
    /// 최대 항목 수 (기본 10, 최대 10)
    pub limit: Option<usize>,
}

/// 리더보드 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// 열람자 주소 (있으면 4위로 포함)
    pub viewer: Option<String>,
}

/// 커뮤니티 통계 응답 (임팩트/지역/추이 묶음)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityStatsResponse {
    pub impact_metrics: Vec<ImpactMetric>,
    pub regions: Vec<RegionStats>,
    pub timeline: Vec<TimelinePoint>,
}

/// 히스토리 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActionsResponse {
    pub address: String,
    pub actions: Vec<LoggedAction>,
}

// ============ Handlers ============

/// GET /stats/user/:address
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    let address = EthAddress::new(&address).map_err(ApiError::ValidationError)?;

    let stats = state
        .stats
        .user_stats(address.as_str())
        .await
        .map_err(|err| {
            tracing::error!("user_stats failed: {:?}", err);
            ApiError::ServiceUnavailable("Stats provider".to_string())
        })?;

    Ok(Json(stats))
}

/// GET /stats/user/:address/actions
///
/// 최근 로깅된 액션 히스토리 (최대 10건)
pub async fn get_user_actions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<UserActionsResponse>, ApiError> {
    let address = EthAddress::new(&address).map_err(ApiError::ValidationError)?;
    let limit = query.limit.unwrap_or(10).min(10);

    let actions = state
        .stats
        .user_actions(address.as_str(), limit)
        .await
        .map_err(|err| {
            tracing::error!("user_actions failed: {:?}", err);
            ApiError::ServiceUnavailable("Stats provider".to_string())
        })?;

    Ok(Json(UserActionsResponse {
        address: address.to_string(),
        actions,
    }))
}

/// GET /stats/global
pub async fn get_global_stats(
    State(state): State<AppState>,
) -> Result<Json<GlobalStats>, ApiError> {
    let stats = state.stats.global_stats().await.map_err(|err| {
        tracing::error!("global_stats failed: {:?}", err);
        ApiError::ServiceUnavailable("Stats provider".to_string())
    })?;

    Ok(Json(stats))
}

/// GET /stats/community
///
/// 임팩트 지표 + 지역 집계 + 최근 7일 추이
pub async fn get_community_stats(
    State(state): State<AppState>,
) -> Result<Json<CommunityStatsResponse>, ApiError> {
    let (impact, regions, timeline) = tokio::join!(
        state.stats.impact_metrics(),
        state.stats.region_stats(),
        state.stats.activity_timeline(),
    );

    let unavailable = |err: anyhow::Error| {
        tracing::error!("community stats failed: {:?}", err);
        ApiError::ServiceUnavailable("Stats provider".to_string())
    };

    Ok(Json(CommunityStatsResponse {
        impact_metrics: impact.map_err(unavailable)?,
        regions: regions.map_err(unavailable)?,
        timeline: timeline.map_err(unavailable)?,
    }))
}

/// GET /stats/leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let viewer = match &query.viewer {
        Some(raw) => Some(EthAddress::new(raw).map_err(ApiError::ValidationError)?),
        None => None,
    };

    let board = state
        .stats
        .leaderboard(viewer.as_ref().map(|a| a.as_str()))
        .await
        .map_err(|err| {
            tracing::error!("leaderboard failed: {:?}", err);
            ApiError::ServiceUnavailable("Stats provider".to_string())
        })?;

    Ok(Json(board))
}
