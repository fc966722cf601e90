//! EcoTala Contract Service
//!
//! Handles EcoTala smart contract interactions.
//!
//! # Features
//! - 액션 카탈로그 (이름/포인트/아이콘)
//! - logAction(string,string) 호출 데이터 ABI 인코딩
//! - read-only 조회 (포인트, 액션 수, 글로벌 통계)
//! - 포인트 임계값 기반 rank 계산
//!
//! 서명/가스/확정은 전부 외부 지갑 콜라보레이터 몫이다.
//! 이 서비스는 호출 데이터를 만들고 결과 콜백에 반응할 뿐이다.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use ethers::abi::parse_abi;
use ethers::contract::{BaseContract, Contract};
use ethers::providers::{Http, Provider};
use ethers::types::{Address, U256};
use serde::Serialize;

/// 로깅 가능한 액션 카탈로그 항목
#[derive(Debug, Clone, Serialize)]
pub struct EcoAction {
    pub name: &'static str,
    pub points: u32,
    pub icon: &'static str,
}

/// 빌드 타임 고정 액션 카탈로그
pub static ECO_ACTIONS: [EcoAction; 5] = [
    EcoAction { name: "Recycle Plastic", points: 10, icon: "♻️" },
    EcoAction { name: "Reusable Cup", points: 8, icon: "☕" },
    EcoAction { name: "Carpool", points: 15, icon: "🚗" },
    EcoAction { name: "Plant Tree", points: 20, icon: "🌳" },
    EcoAction { name: "Solar Energy", points: 12, icon: "☀️" },
];

/// 카탈로그에서 액션 조회
pub fn find_action(name: &str) -> Option<&'static EcoAction> {
    ECO_ACTIONS.iter().find(|action| action.name == name)
}

/// 액션 아이콘 조회 (없으면 기본 아이콘)
pub fn action_icon(name: &str) -> &'static str {
    find_action(name).map(|a| a.icon).unwrap_or("🌱")
}

/// 포인트 → rank 라벨
///
/// 5단계 임계값: 500 / 200 / 100 / 50
pub fn calculate_rank(points: u64) -> &'static str {
    if points >= 500 {
        "Eco Champion"
    } else if points >= 200 {
        "Eco Warrior"
    } else if points >= 100 {
        "Eco Guardian"
    } else if points >= 50 {
        "Eco Friend"
    } else {
        "Eco Beginner"
    }
}

/// 온체인 타임스탬프(초) → 표시용 날짜 문자열
pub fn format_timestamp(secs: i64) -> String {
    match chrono::DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => String::new(),
    }
}

/// 컨트랙트 연동 설정
#[derive(Debug, Clone)]
pub struct ContractConfig {
    /// EcoTala 컨트랙트 주소 (없으면 demo 전용)
    pub address: Option<String>,
    /// Chain ID (기본: 84532, Base Sepolia)
    pub chain_id: u64,
    /// Read-only 조회용 RPC URL
    pub rpc_url: String,
}

/// 외부 지갑 콜라보레이터에 넘길 호출 기술서
///
/// data에는 (actionType, photoHash) 두 인자만 인코딩된다.
/// proof metadata는 여기 실리지 않는다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub to: String,
    /// 0x-prefixed ABI 인코딩 호출 데이터
    pub data: String,
    pub chain_id: u64,
}

/// EcoTala Contract Service
///
/// # Example
/// ```ignore
/// let contract = EcoTalaContract::new(config)?;
/// let call = contract.log_action_call("Plant Tree", "QmAbc...")?;
/// // call.to / call.data를 지갑에 전달
/// ```
pub struct EcoTalaContract {
    config: ContractConfig,
    base: BaseContract,
}

impl EcoTalaContract {
    pub fn new(config: ContractConfig) -> Result<Self> {
        let abi = parse_abi(&[
            "function logAction(string actionType, string photoHash)",
            "function getUserPoints(address user) view returns (uint256)",
            "function getUserActionCount(address user) view returns (uint256)",
            "function getGlobalStats() view returns (uint256 totalActions, uint256 totalUsers, uint256 totalPointsAwarded)",
        ])
        .context("Failed to parse EcoTala ABI")?;

        Ok(Self {
            config,
            base: BaseContract::from(abi),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// 컨트랙트 주소가 설정되어 있는지
    pub fn is_configured(&self) -> bool {
        self.config.address.is_some()
    }

    fn address(&self) -> Result<Address> {
        let raw = self
            .config
            .address
            .as_ref()
            .ok_or_else(|| anyhow!("Contract address not configured"))?;
        raw.parse::<Address>()
            .with_context(|| format!("Invalid contract address: {}", raw))
    }

    /// logAction 호출 데이터 생성
    ///
    /// selector + ABI 인코딩된 (actionType, photoHash)
    pub fn log_action_call(&self, action_type: &str, photo_hash: &str) -> Result<CallRequest> {
        let address = self.address()?;
        let data = self
            .base
            .encode("logAction", (action_type.to_string(), photo_hash.to_string()))
            .context("Failed to encode logAction call")?;

        Ok(CallRequest {
            to: format!("{:#x}", address),
            data: format!("0x{}", hex::encode(&data)),
            chain_id: self.config.chain_id,
        })
    }

    /// Read-only 조회용 컨트랙트 인스턴스 생성
    fn read_contract(&self) -> Result<Contract<Provider<Http>>> {
        let address = self.address()?;
        let provider = Provider::<Http>::try_from(self.config.rpc_url.as_str())
            .with_context(|| format!("Invalid RPC URL: {}", self.config.rpc_url))?;
        Ok(Contract::new(address, self.base.clone(), Arc::new(provider)))
    }

    /// 사용자 누적 포인트 조회
    pub async fn get_user_points(&self, user: &str) -> Result<u64> {
        let user: Address = user.parse().context("Invalid user address")?;
        let contract = self.read_contract()?;
        let points: U256 = contract
            .method::<_, U256>("getUserPoints", user)?
            .call()
            .await
            .context("getUserPoints call failed")?;
        Ok(points.as_u64())
    }

    /// 사용자 액션 수 조회
    pub async fn get_user_action_count(&self, user: &str) -> Result<u64> {
        let user: Address = user.parse().context("Invalid user address")?;
        let contract = self.read_contract()?;
        let count: U256 = contract
            .method::<_, U256>("getUserActionCount", user)?
            .call()
            .await
            .context("getUserActionCount call failed")?;
        Ok(count.as_u64())
    }

    /// 글로벌 통계 조회: (totalActions, totalUsers, totalPointsAwarded)
    pub async fn get_global_stats(&self) -> Result<(u64, u64, u64)> {
        let contract = self.read_contract()?;
        let (actions, users, points): (U256, U256, U256) = contract
            .method::<_, (U256, U256, U256)>("getGlobalStats", ())?
            .call()
            .await
            .context("getGlobalStats call failed")?;
        Ok((actions.as_u64(), users.as_u64(), points.as_u64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ADDRESS: &str = "0x1234567890123456789012345678901234567890";

    fn test_contract() -> EcoTalaContract {
        EcoTalaContract::new(ContractConfig {
            address: Some(TEST_ADDRESS.to_string()),
            chain_id: 84532,
            rpc_url: "https://sepolia.base.org".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_catalog_entries() {
        assert_eq!(ECO_ACTIONS.len(), 5);
        let tree = find_action("Plant Tree").unwrap();
        assert_eq!(tree.points, 20);
        assert_eq!(tree.icon, "🌳");
        assert!(find_action("Fly Drone").is_none());
        assert_eq!(action_icon("Unknown"), "🌱");
    }

    #[test]
    fn test_rank_thresholds() {
        assert_eq!(calculate_rank(0), "Eco Beginner");
        assert_eq!(calculate_rank(49), "Eco Beginner");
        assert_eq!(calculate_rank(50), "Eco Friend");
        assert_eq!(calculate_rank(99), "Eco Friend");
        assert_eq!(calculate_rank(100), "Eco Guardian");
        assert_eq!(calculate_rank(199), "Eco Guardian");
        assert_eq!(calculate_rank(200), "Eco Warrior");
        assert_eq!(calculate_rank(499), "Eco Warrior");
        assert_eq!(calculate_rank(500), "Eco Champion");
    }

    #[test]
    fn test_log_action_call_encoding() {
        let contract = test_contract();
        let call = contract
            .log_action_call("Plant Tree", "QmAbc123")
            .unwrap();

        assert_eq!(call.to, TEST_ADDRESS);
        assert_eq!(call.chain_id, 84532);

        // 0x + 4바이트 selector로 시작
        let selector = contract
            .base
            .abi()
            .function("logAction")
            .unwrap()
            .short_signature();
        assert!(call.data.starts_with(&format!("0x{}", hex::encode(selector))));

        // 인자 round-trip
        let raw = hex::decode(call.data.trim_start_matches("0x")).unwrap();
        let (action, hash): (String, String) = contract.base.decode("logAction", raw).unwrap();
        assert_eq!(action, "Plant Tree");
        assert_eq!(hash, "QmAbc123");
    }

    #[test]
    fn test_log_action_requires_address() {
        let contract = EcoTalaContract::new(ContractConfig {
            address: None,
            chain_id: 84532,
            rpc_url: "https://sepolia.base.org".to_string(),
        })
        .unwrap();

        assert!(!contract.is_configured());
        assert!(contract.log_action_call("Plant Tree", "QmAbc").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        // 2025-09-05 00:00:00 UTC
        assert_eq!(format_timestamp(1_757_030_400), "Sep 5, 2025");
    }
}
