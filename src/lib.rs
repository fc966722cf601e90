//! EcoTala API Library
//!
//! # Overview
//!
//! 이 라이브러리는 EcoTala(환경 액션 로깅 앱)의 백엔드 API를 제공합니다.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌─────────┐   │
//! │  │ Routes  │  │Services │  │  Stats   │  │  Types  │   │
//! │  └────┬────┘  └────┬────┘  └────┬─────┘  └────┬────┘   │
//! │       │            │            │             │         │
//! │       └────────────┴─────┬──────┴─────────────┘         │
//! │                          │                              │
//! └──────────────────────────┼──────────────────────────────┘
//!                ┌───────────┼───────────┐
//!                ▼           ▼           ▼
//!         ┌──────────┐ ┌──────────┐ ┌──────────┐
//!         │  Pinata  │ │ Contract │ │  Wallet  │
//!         │  (IPFS)  │ │  (read)  │ │ (extern) │
//!         └──────────┘ └──────────┘ └──────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (업로드 파이프라인, 워크플로우, 통계)
//! - `types`: 공통 타입 정의
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ecotala_api::{config::Config, services::{GeoLocator, IpfsService}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let ipfs = IpfsService::new(ipfs_config, GeoLocator::new(None));
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::ApiError;
pub use services::{EcoTalaContract, IpfsService, NotificationHub, StatsProvider, SubmissionStore};

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ipfs: Arc<IpfsService>,
    pub contract: Arc<EcoTalaContract>,
    pub stats: Arc<dyn StatsProvider>,
    pub notifications: Arc<NotificationHub>,
    pub submissions: Arc<SubmissionStore>,
}
