//! Share Service
//!
//! 소셜 공유 메시지 템플릿과 플랫폼별 공유 링크 구성.
//! 실제 게시는 외부(사용자 브라우저/앱)에서 일어난다.

use serde::Serialize;
use url::Url;

use crate::services::stats::UserStats;

/// 공유 링크에 쓰이는 앱 URL
pub const APP_URL: &str = "https://ecotala.app";

/// 템플릿 렌더링에 쓰이는 사용자 데이터
#[derive(Debug, Clone)]
pub struct ShareData {
    pub points: u64,
    pub actions: u64,
    pub rank: String,
    /// 축약 지갑 주소 표기
    pub wallet: String,
    /// 추정 CO₂ 절감량 (kg)
    pub carbon_saved: u64,
    /// 추정 재활용량 (kg)
    pub waste_recycled: u64,
}

impl ShareData {
    /// 사용자 통계에서 공유 데이터 구성
    ///
    /// 환산 계수: 액션당 CO₂ 2.5kg / 폐기물 1.2kg (추정치)
    pub fn from_stats(stats: &UserStats, wallet: String) -> Self {
        Self {
            points: stats.points,
            actions: stats.action_count,
            rank: stats.rank.clone(),
            wallet,
            carbon_saved: (stats.action_count as f64 * 2.5).round() as u64,
            waste_recycled: (stats.action_count as f64 * 1.2).round() as u64,
        }
    }
}

/// 공유 템플릿
pub struct ShareTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub hashtags: &'static [&'static str],
    render: fn(&ShareData) -> String,
}

impl ShareTemplate {
    pub fn render(&self, data: &ShareData) -> String {
        (self.render)(data)
    }
}

/// 템플릿 목록 응답용 (렌더 함수 제외)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTemplateInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub hashtags: Vec<&'static str>,
}

/// 고정 공유 템플릿 6종
pub static SHARE_TEMPLATES: [ShareTemplate; 6] = [
    ShareTemplate {
        id: "points",
        title: "Points Achievement",
        description: "Share your total eco-points earned",
        icon: "⭐",
        hashtags: &["EcoTala", "GreenPhilippines", "BaseBlockchain", "ClimateAction"],
        render: |data| {
            format!(
                "🌱 I just earned {} eco-points on EcoTala by taking environmental action! Join me in making the Philippines greener! 💚 #EcoTala #GreenPhilippines #BaseBlockchain",
                data.points
            )
        },
    },
    ShareTemplate {
        id: "actions",
        title: "Action Count",
        description: "Celebrate your environmental actions",
        icon: "🎯",
        hashtags: &["EcoTala", "EnvironmentalAction", "Bayanihan", "Sustainability"],
        render: |data| {
            format!(
                "🌿 I've completed {} eco-friendly actions on EcoTala! From waste segregation to tree planting, every action counts! 🇵🇭 #EcoTala #EnvironmentalAction #Bayanihan",
                data.actions
            )
        },
    },
    ShareTemplate {
        id: "rank",
        title: "Eco Rank",
        description: "Show off your eco-warrior status",
        icon: "🏆",
        hashtags: &["EcoTala", "EcoWarrior", "ClimateAction", "Philippines"],
        render: |data| {
            format!(
                "🏆 Proud to be an \"{}\" on EcoTala! Together, we Filipinos are fighting climate change one action at a time! 💪 #EcoTala #EcoWarrior #ClimateAction",
                data.rank
            )
        },
    },
    ShareTemplate {
        id: "impact",
        title: "Environmental Impact",
        description: "Share your carbon footprint reduction",
        icon: "🌍",
        hashtags: &["EcoTala", "CarbonFootprint", "WasteReduction", "SustainableLiving"],
        render: |data| {
            format!(
                "🌍 My EcoTala actions have helped save approximately {}kg of CO₂ and diverted {}kg of waste! Small actions, big impact! 🌱 #EcoTala #CarbonFootprint #WasteReduction",
                data.carbon_saved, data.waste_recycled
            )
        },
    },
    ShareTemplate {
        id: "community",
        title: "Community Movement",
        description: "Invite others to join the movement",
        icon: "🤝",
        hashtags: &["EcoTala", "Bayanihan", "GreenPhilippines", "CommunityAction"],
        render: |_| {
            "🇵🇭 Join me and thousands of Filipinos on EcoTala! Together we're making our country cleaner and greener through blockchain-verified eco-actions! Let's show the world what bayanihan can do! 💚 #EcoTala #Bayanihan #GreenPhilippines".to_string()
        },
    },
    ShareTemplate {
        id: "milestone",
        title: "Personal Milestone",
        description: "Celebrate reaching goals",
        icon: "🎉",
        hashtags: &["EcoTala", "MilestoneAchieved", "EnvironmentalHero", "GoalReached"],
        render: |data| {
            format!(
                "🎉 Milestone unlocked! I've taken {} environmental actions and earned {} points on EcoTala! Every Filipino can make a difference - join the movement! 🌱 #EcoTala #MilestoneAchieved #EnvironmentalHero",
                data.actions, data.points
            )
        },
    },
];

/// 템플릿 조회
pub fn find_template(id: &str) -> Option<&'static ShareTemplate> {
    SHARE_TEMPLATES.iter().find(|t| t.id == id)
}

/// 템플릿 목록 (응답용)
pub fn template_infos() -> Vec<ShareTemplateInfo> {
    SHARE_TEMPLATES
        .iter()
        .map(|t| ShareTemplateInfo {
            id: t.id,
            title: t.title,
            description: t.description,
            icon: t.icon,
            hashtags: t.hashtags.to_vec(),
        })
        .collect()
}

/// 공유 메시지 구성
///
/// custom_message가 있으면 템플릿보다 우선한다.
pub fn compose_message(
    template_id: &str,
    custom_message: Option<&str>,
    data: &ShareData,
) -> Option<String> {
    if let Some(custom) = custom_message {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    find_template(template_id).map(|t| t.render(data))
}

/// 플랫폼별 공유 링크 생성
///
/// copy는 링크가 아니라 클립보드 대상이므로 None을 돌려주고,
/// 호출 측이 메시지 + 앱 URL을 그대로 내려준다.
pub fn share_link(platform: &str, message: &str) -> Option<String> {
    let url = match platform {
        "twitter" => Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[("text", message), ("url", APP_URL)],
        ),
        "facebook" => Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            &[("u", APP_URL), ("quote", message)],
        ),
        "linkedin" => Url::parse_with_params(
            "https://www.linkedin.com/sharing/share-offsite/",
            &[("url", APP_URL), ("summary", message)],
        ),
        _ => return None,
    };

    url.ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ShareData {
        ShareData {
            points: 120,
            actions: 12,
            rank: "Eco Guardian".to_string(),
            wallet: "0x1234...7890".to_string(),
            carbon_saved: 30,
            waste_recycled: 14,
        }
    }

    #[test]
    fn test_six_templates() {
        assert_eq!(SHARE_TEMPLATES.len(), 6);
        assert_eq!(template_infos().len(), 6);
        assert!(find_template("points").is_some());
        assert!(find_template("nope").is_none());
    }

    #[test]
    fn test_points_template_renders_points() {
        let msg = compose_message("points", None, &data()).unwrap();
        assert!(msg.contains("120 eco-points"));
    }

    #[test]
    fn test_custom_message_overrides_template() {
        let msg = compose_message("points", Some("  my own message "), &data()).unwrap();
        assert_eq!(msg, "my own message");

        // 공백만 있으면 템플릿으로 폴백
        let msg = compose_message("rank", Some("   "), &data()).unwrap();
        assert!(msg.contains("Eco Guardian"));
    }

    #[test]
    fn test_share_data_estimates() {
        let stats = UserStats {
            points: 50,
            action_count: 5,
            rank: "Eco Friend".to_string(),
        };
        let d = ShareData::from_stats(&stats, "0xabcd...ef01".to_string());
        assert_eq!(d.carbon_saved, 13); // 5 * 2.5 = 12.5 → 13
        assert_eq!(d.waste_recycled, 6); // 5 * 1.2 = 6.0
    }

    #[test]
    fn test_share_links() {
        let link = share_link("twitter", "hello world").unwrap();
        assert!(link.starts_with("https://twitter.com/intent/tweet?"));
        assert!(link.contains("hello"));
        // 쿼리 인코딩 확인
        assert!(!link.contains("hello world"));

        assert!(share_link("facebook", "m").unwrap().contains("facebook.com"));
        assert!(share_link("linkedin", "m").unwrap().contains("linkedin.com"));
        assert!(share_link("copy", "m").is_none());
        assert!(share_link("myspace", "m").is_none());
    }
}
