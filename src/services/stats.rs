//! Stats Provider Service
//!
//! 대시보드/커뮤니티 위젯이 읽는 집계 데이터 레이어.
//!
//! # Design Decision
//!
//! demo 제공자와 live 제공자를 같은 trait 뒤에 두고 설정으로
//! 선택한다 (STATS_MODE). 프로덕션 전환이 조건문 산재가 아니라
//! 제공자 교체 한 번으로 끝나도록.
//!
//! live 제공자도 분석형 데이터(impact/region/timeline)는 demo에
//! 위임한다: 체인에는 사용자/글로벌 카운터만 있고 분석 파이프라인은
//! 아직 없기 때문. 체인 read는 사용자/글로벌 통계에만 오버레이된다.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::services::contract::{calculate_rank, format_timestamp, EcoTalaContract};

/// 사용자 집계
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub points: u64,
    pub action_count: u64,
    /// 포인트 임계값에서 유도된 표시 라벨
    pub rank: String,
}

/// 글로벌 집계
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_actions: u64,
    pub total_users: u64,
    pub total_points_awarded: u64,
}

/// 로깅된 액션 한 건 (히스토리 표시용)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedAction {
    pub action_type: String,
    pub photo_hash: String,
    pub points: u32,
    /// epoch seconds
    pub timestamp: i64,
    /// 표시용 날짜 라벨
    pub date: String,
    pub verified: bool,
}

/// 커뮤니티 임팩트 지표
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMetric {
    pub id: &'static str,
    pub title: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// up | down | stable
    pub trend: &'static str,
    pub percentage: f64,
}

/// 지역별 집계
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    pub region: &'static str,
    pub actions: u64,
    pub users: u64,
    pub points: u64,
    pub top_action: &'static str,
}

/// 최근 7일 활동 추이 포인트
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub date: &'static str,
    pub actions: u64,
    pub users: u64,
}

/// 리더보드 항목
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub points: u64,
    pub badge: &'static str,
}

/// 집계 데이터 소스 인터페이스
///
/// demo/live 제공자가 동일한 shape으로 구현한다.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn user_stats(&self, address: &str) -> Result<UserStats>;
    async fn global_stats(&self) -> Result<GlobalStats>;
    async fn user_actions(&self, address: &str, limit: usize) -> Result<Vec<LoggedAction>>;
    async fn impact_metrics(&self) -> Result<Vec<ImpactMetric>>;
    async fn region_stats(&self) -> Result<Vec<RegionStats>>;
    async fn activity_timeline(&self) -> Result<Vec<TimelinePoint>>;
    async fn leaderboard(&self, viewer: Option<&str>) -> Result<Vec<LeaderboardEntry>>;
}

// ============ Demo Provider ============

/// 고정 demo 데이터 제공자
///
/// 체인/분석 연동 없이 전체 UI를 돌릴 수 있게 하는 기본 모드
pub struct DemoStatsProvider;

/// demo 사용자 기본값
const DEMO_POINTS: u64 = 50;
const DEMO_ACTION_COUNT: u64 = 5;

impl DemoStatsProvider {
    fn demo_regions() -> Vec<RegionStats> {
        vec![
            RegionStats { region: "Metro Manila", actions: 2847, users: 1245, points: 28470, top_action: "Waste Segregation" },
            RegionStats { region: "Cebu", actions: 1523, users: 687, points: 15230, top_action: "Beach Cleanup" },
            RegionStats { region: "Davao", actions: 1287, users: 543, points: 12870, top_action: "Tree Planting" },
            RegionStats { region: "Iloilo", actions: 892, users: 398, points: 8920, top_action: "Plastic Collection" },
            RegionStats { region: "Baguio", actions: 654, users: 287, points: 6540, top_action: "Mountain Cleanup" },
        ]
    }
}

#[async_trait]
impl StatsProvider for DemoStatsProvider {
    async fn user_stats(&self, _address: &str) -> Result<UserStats> {
        Ok(UserStats {
            points: DEMO_POINTS,
            action_count: DEMO_ACTION_COUNT,
            rank: calculate_rank(DEMO_POINTS).to_string(),
        })
    }

    async fn global_stats(&self) -> Result<GlobalStats> {
        // 지역 demo 데이터의 합계
        let regions = Self::demo_regions();
        Ok(GlobalStats {
            total_actions: regions.iter().map(|r| r.actions).sum(),
            total_users: regions.iter().map(|r| r.users).sum(),
            total_points_awarded: regions.iter().map(|r| r.points).sum(),
        })
    }

    async fn user_actions(&self, _address: &str, limit: usize) -> Result<Vec<LoggedAction>> {
        Ok(synthesize_actions(DEMO_ACTION_COUNT, limit))
    }

    async fn impact_metrics(&self) -> Result<Vec<ImpactMetric>> {
        Ok(vec![
            ImpactMetric {
                id: "waste-diverted",
                title: "Waste Diverted",
                value: 2547.0,
                unit: "kg",
                icon: "♻️",
                description: "Total waste properly segregated and diverted from landfills",
                trend: "up",
                percentage: 23.5,
            },
            ImpactMetric {
                id: "trees-planted",
                title: "Trees Planted",
                value: 1289.0,
                unit: "trees",
                icon: "🌳",
                description: "Native trees planted across the Philippines",
                trend: "up",
                percentage: 45.2,
            },
            ImpactMetric {
                id: "carbon-offset",
                title: "Carbon Offset",
                value: 12.3,
                unit: "tons CO₂",
                icon: "🌍",
                description: "Estimated carbon emissions offset by community actions",
                trend: "up",
                percentage: 18.7,
            },
            ImpactMetric {
                id: "plastic-bottles",
                title: "Plastic Bottles",
                value: 8924.0,
                unit: "bottles",
                icon: "🥤",
                description: "Plastic bottles collected and properly recycled",
                trend: "up",
                percentage: 31.4,
            },
            ImpactMetric {
                id: "cleanup-areas",
                title: "Areas Cleaned",
                value: 47.0,
                unit: "locations",
                icon: "🏖️",
                description: "Parks, beaches, and communities cleaned by eco warriors",
                trend: "stable",
                percentage: 0.0,
            },
            ImpactMetric {
                id: "water-saved",
                title: "Water Saved",
                value: 15680.0,
                unit: "liters",
                icon: "💧",
                description: "Water conservation through sustainable practices",
                trend: "up",
                percentage: 12.8,
            },
        ])
    }

    async fn region_stats(&self) -> Result<Vec<RegionStats>> {
        Ok(Self::demo_regions())
    }

    async fn activity_timeline(&self) -> Result<Vec<TimelinePoint>> {
        Ok(vec![
            TimelinePoint { date: "Sep 5", actions: 287, users: 156 },
            TimelinePoint { date: "Sep 4", actions: 234, users: 143 },
            TimelinePoint { date: "Sep 3", actions: 198, users: 128 },
            TimelinePoint { date: "Sep 2", actions: 167, users: 98 },
            TimelinePoint { date: "Sep 1", actions: 145, users: 87 },
            TimelinePoint { date: "Aug 31", actions: 123, users: 76 },
            TimelinePoint { date: "Aug 30", actions: 98, users: 54 },
        ])
    }

    async fn leaderboard(&self, viewer: Option<&str>) -> Result<Vec<LeaderboardEntry>> {
        let viewer_stats = match viewer {
            Some(address) => Some((self.user_stats(address).await?, address.to_string())),
            None => None,
        };
        Ok(build_leaderboard(viewer_stats))
    }
}

// ============ Live Provider ============

/// 컨트랙트 read 오버레이 제공자
///
/// 사용자/글로벌 통계는 체인에서 읽고, 분석형 데이터는 demo에 위임
pub struct ContractStatsProvider {
    contract: Arc<EcoTalaContract>,
    demo: DemoStatsProvider,
}

impl ContractStatsProvider {
    pub fn new(contract: Arc<EcoTalaContract>) -> Self {
        Self {
            contract,
            demo: DemoStatsProvider,
        }
    }
}

#[async_trait]
impl StatsProvider for ContractStatsProvider {
    async fn user_stats(&self, address: &str) -> Result<UserStats> {
        let points = self.contract.get_user_points(address).await?;
        let action_count = self.contract.get_user_action_count(address).await?;
        Ok(UserStats {
            points,
            action_count,
            rank: calculate_rank(points).to_string(),
        })
    }

    async fn global_stats(&self) -> Result<GlobalStats> {
        let (total_actions, total_users, total_points_awarded) =
            self.contract.get_global_stats().await?;
        Ok(GlobalStats {
            total_actions,
            total_users,
            total_points_awarded,
        })
    }

    async fn user_actions(&self, address: &str, limit: usize) -> Result<Vec<LoggedAction>> {
        // 카운트만 체인에서 읽고 항목은 합성한다.
        // 컨트랙트의 getUserAction(index) 순회는 아직 배선되지 않음.
        let count = self.contract.get_user_action_count(address).await?;
        Ok(synthesize_actions(count, limit))
    }

    async fn impact_metrics(&self) -> Result<Vec<ImpactMetric>> {
        self.demo.impact_metrics().await
    }

    async fn region_stats(&self) -> Result<Vec<RegionStats>> {
        self.demo.region_stats().await
    }

    async fn activity_timeline(&self) -> Result<Vec<TimelinePoint>> {
        self.demo.activity_timeline().await
    }

    async fn leaderboard(&self, viewer: Option<&str>) -> Result<Vec<LeaderboardEntry>> {
        let viewer_stats = match viewer {
            Some(address) => Some((self.user_stats(address).await?, address.to_string())),
            None => None,
        };
        Ok(build_leaderboard(viewer_stats))
    }
}

// ============ Helpers ============

/// 액션 카운트에서 히스토리 항목 합성 (최근 10건 제한)
fn synthesize_actions(count: u64, limit: usize) -> Vec<LoggedAction> {
    let now = Utc::now().timestamp();
    let n = (count as usize).min(limit).min(10);

    (0..n)
        .map(|i| {
            // i일 전
            let timestamp = now - (i as i64) * 86_400;
            LoggedAction {
                action_type: "Recycle Plastic".to_string(),
                photo_hash: format!("demo_photo_{}", i),
                points: 10,
                timestamp,
                date: format_timestamp(timestamp),
                verified: true,
            }
        })
        .collect()
}

/// 고정 상위 3명 + 열람자(4위) 리더보드 구성
fn build_leaderboard(viewer: Option<(UserStats, String)>) -> Vec<LeaderboardEntry> {
    let mut entries = vec![
        LeaderboardEntry { rank: 1, name: "EcoChampion".to_string(), points: 2500, badge: "🥇" },
        LeaderboardEntry { rank: 2, name: "GreenWarrior".to_string(), points: 1800, badge: "🥈" },
        LeaderboardEntry { rank: 3, name: "PlantMaster".to_string(), points: 1200, badge: "🥉" },
    ];

    if let Some((stats, address)) = viewer {
        let name = if address.len() >= 8 {
            format!("{}...", &address[..8])
        } else {
            "You".to_string()
        };
        entries.push(LeaderboardEntry {
            rank: 4,
            name,
            points: stats.points,
            badge: "🌱",
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWER: &str = "0x1234567890123456789012345678901234567890";

    #[tokio::test]
    async fn test_demo_user_stats_rank_is_consistent() {
        let provider = DemoStatsProvider;
        let stats = provider.user_stats(VIEWER).await.unwrap();
        assert_eq!(stats.points, 50);
        assert_eq!(stats.action_count, 5);
        assert_eq!(stats.rank, "Eco Friend");
    }

    #[tokio::test]
    async fn test_demo_global_stats_sum_regions() {
        let provider = DemoStatsProvider;
        let global = provider.global_stats().await.unwrap();
        assert_eq!(global.total_actions, 7203);
        assert_eq!(global.total_users, 3160);
        assert_eq!(global.total_points_awarded, 72030);
    }

    #[tokio::test]
    async fn test_demo_analytics_shapes() {
        let provider = DemoStatsProvider;
        assert_eq!(provider.impact_metrics().await.unwrap().len(), 6);
        assert_eq!(provider.region_stats().await.unwrap().len(), 5);
        assert_eq!(provider.activity_timeline().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_demo_user_actions_capped() {
        let provider = DemoStatsProvider;
        let actions = provider.user_actions(VIEWER, 3).await.unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].photo_hash, "demo_photo_0");
        assert!(actions.iter().all(|a| a.verified));
    }

    #[tokio::test]
    async fn test_leaderboard_includes_viewer_at_rank_4() {
        let provider = DemoStatsProvider;
        let board = provider.leaderboard(Some(VIEWER)).await.unwrap();
        assert_eq!(board.len(), 4);
        assert_eq!(board[0].name, "EcoChampion");
        assert_eq!(board[3].rank, 4);
        assert_eq!(board[3].name, "0x123456...");
        assert_eq!(board[3].badge, "🌱");
    }

    #[tokio::test]
    async fn test_leaderboard_without_viewer() {
        let provider = DemoStatsProvider;
        let board = provider.leaderboard(None).await.unwrap();
        assert_eq!(board.len(), 3);
    }
}
