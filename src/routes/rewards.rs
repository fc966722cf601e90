//! Rewards Endpoints
//!
//! 업적/NFT 보상 조회와 클레임. 클레임은 체인에 쓰지 않고
//! 알림만 발생시킨다. 실제 발행은 out of scope.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::services::notifications::NotificationKind;
use crate::services::rewards::{
    build_achievements, build_nft_rewards, claimable_achievement, Achievement, NftReward,
};
use crate::services::stats::UserStats;
use crate::types::EthAddress;
use crate::AppState;

// ============ Request/Response Types ============

/// 보상 현황 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsResponse {
    pub address: String,
    pub stats: UserStats,
    pub achievements: Vec<Achievement>,
    pub nft_rewards: Vec<NftReward>,
}

/// 클레임 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub claimed: bool,
    pub reward: String,
}

// ============ Handlers ============

/// GET /rewards/:address
///
/// 사용자 통계에서 업적/NFT 보상 상태를 유도해 반환
pub async fn get_rewards(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<RewardsResponse>, ApiError> {
    let address = EthAddress::new(&address).map_err(ApiError::ValidationError)?;

    let stats = state
        .stats
        .user_stats(address.as_str())
        .await
        .map_err(|err| {
            tracing::error!("user_stats failed: {:?}", err);
            ApiError::ServiceUnavailable("Stats provider".to_string())
        })?;

    Ok(Json(RewardsResponse {
        address: address.to_string(),
        achievements: build_achievements(&stats),
        nft_rewards: build_nft_rewards(&stats),
        stats,
    }))
}

/// POST /rewards/:address/claim/:id
///
/// 잠금 해제된 업적만 클레임 가능. 성공 시 알림 발송.
pub async fn claim_reward(
    State(state): State<AppState>,
    Path((address, id)): Path<(String, String)>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let address = EthAddress::new(&address).map_err(ApiError::ValidationError)?;

    let stats = state
        .stats
        .user_stats(address.as_str())
        .await
        .map_err(|err| {
            tracing::error!("user_stats failed: {:?}", err);
            ApiError::ServiceUnavailable("Stats provider".to_string())
        })?;

    let achievement = claimable_achievement(&stats, &id)
        .ok_or_else(|| ApiError::NotFound("Claimable achievement".to_string()))?;

    state
        .notifications
        .send(
            "🎉 Reward Claimed!",
            format!("You've claimed: {}", achievement.reward),
            NotificationKind::Success,
        )
        .await;

    Ok(Json(ClaimResponse {
        claimed: true,
        reward: achievement.reward.to_string(),
    }))
}
