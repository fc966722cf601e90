//! Configuration Module
//!
//! # Interview Q&A
//!
//! Q: 환경변수 vs 설정 파일, 어떤 방식을 선택했고 왜인가?
//! A: 환경변수를 선택
//!    - 12-Factor App 원칙 준수
//!    - Docker/K8s 배포 시 환경별 설정 분리 용이
//!    - 민감 정보(Pinata 시크릿 키 등)를 코드에 포함하지 않음
//!    - CI/CD 파이프라인에서 쉽게 주입 가능
//!
//! Q: 설정 검증은 어떻게 하는가?
//! A: from_env()에서 파싱 검증 → 실패하면 즉시 실패 (fail-fast)
//!    - 앱 시작 시점에 PORT, CHAIN_ID 등 숫자 값 검증
//!    - 런타임 에러보다 시작 실패가 디버깅에 유리
//!    - Pinata 키는 옵션: 없으면 로컬 fingerprint 모드로 동작

use std::env;

use anyhow::{Context, Result};

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트 (기본값: 3001)
    pub port: u16,

    /// Pinata API 키 (옵션)
    /// 없으면 원격 pinning 없이 로컬 fingerprint로 폴백
    pub pinata_api_key: Option<String>,

    /// Pinata 시크릿 키 (옵션)
    pub pinata_secret_key: Option<String>,

    /// Pinata pinFileToIPFS 엔드포인트
    pub pinata_pin_endpoint: String,

    /// IPFS 게이트웨이 base URL (조회용)
    pub ipfs_gateway_url: String,

    /// 위치 조회 엔드포인트 (옵션, 없으면 위치 없이 진행)
    pub geo_lookup_url: Option<String>,

    /// EcoTala 컨트랙트 주소 (옵션)
    pub contract_address: Option<String>,

    /// Chain ID (기본값: 84532, Base Sepolia)
    pub chain_id: u64,

    /// Ethereum RPC URL (read-only 컨트랙트 조회용)
    pub eth_rpc_url: String,

    /// 통계 데이터 소스 (demo | live)
    pub stats_mode: StatsMode,

    /// 환경 (development, staging, production)
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// 통계 제공자 선택
///
/// demo: 고정 demo 데이터 (체인 조회 없음)
/// live: 컨트랙트 read + demo 분석 데이터 오버레이
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsMode {
    Demo,
    Live,
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Optional Environment Variables
    ///
    /// - `PORT`: 서버 포트 (기본값: 3001)
    /// - `PINATA_API_KEY` / `PINATA_SECRET_KEY`: pinning 자격증명
    /// - `PINATA_PIN_ENDPOINT`: pin 엔드포인트
    /// - `IPFS_GATEWAY_URL`: 게이트웨이 base URL
    /// - `GEO_LOOKUP_URL`: 위치 조회 엔드포인트
    /// - `CONTRACT_ADDRESS`: EcoTala 컨트랙트 주소
    /// - `CHAIN_ID`: 체인 ID (기본값: 84532)
    /// - `ETH_RPC_URL`: RPC URL
    /// - `STATS_MODE`: demo | live
    /// - `ENVIRONMENT`: development | staging | production
    ///
    /// # Design Decision
    ///
    /// 필수 값 없이 전부 기본값으로 기동 가능:
    /// - Pinata 키 없음 → 로컬 fingerprint 모드
    /// - 컨트랙트 주소 없음 → demo 통계만 제공
    pub fn from_env() -> Result<Self> {
        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let stats_mode = match env::var("STATS_MODE")
            .unwrap_or_else(|_| "demo".to_string())
            .to_lowercase()
            .as_str()
        {
            "live" => StatsMode::Live,
            _ => StatsMode::Demo,
        };

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            pinata_api_key: env::var("PINATA_API_KEY").ok().filter(|k| !k.is_empty()),
            pinata_secret_key: env::var("PINATA_SECRET_KEY").ok().filter(|k| !k.is_empty()),

            pinata_pin_endpoint: env::var("PINATA_PIN_ENDPOINT").unwrap_or_else(|_| {
                "https://api.pinata.cloud/pinning/pinFileToIPFS".to_string()
            }),

            ipfs_gateway_url: env::var("IPFS_GATEWAY_URL")
                .unwrap_or_else(|_| "https://gateway.pinata.cloud/ipfs".to_string()),

            geo_lookup_url: env::var("GEO_LOOKUP_URL").ok().filter(|u| !u.is_empty()),

            contract_address: env::var("CONTRACT_ADDRESS").ok().filter(|a| !a.is_empty()),

            chain_id: env::var("CHAIN_ID")
                .unwrap_or_else(|_| "84532".to_string())
                .parse()
                .context("CHAIN_ID must be a valid number")?,

            eth_rpc_url: env::var("ETH_RPC_URL")
                .unwrap_or_else(|_| "https://sepolia.base.org".to_string()),

            stats_mode,
            environment,
        })
    }

    /// 프로덕션 환경인지 확인
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Pinata 자격증명이 모두 설정되었는지 확인
    pub fn pinning_configured(&self) -> bool {
        self.pinata_api_key.is_some() && self.pinata_secret_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // 환경변수 없이 기본값으로 설정 생성
        let config = Config::from_env().unwrap();
        assert_eq!(config.chain_id, 84532);
        assert_eq!(config.stats_mode, StatsMode::Demo);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_pinning_not_configured_by_default() {
        let config = Config::from_env().unwrap();
        assert!(!config.pinning_configured());
    }
}
