//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `photo`: 사진 검증 + 압축
//! - `geo`: best-effort 위치 조회
//! - `ipfs`: Pinata 업로드 / 로컬 fingerprint 폴백
//! - `proof`: proof metadata + integrity digest
//! - `contract`: 액션 카탈로그, 호출 인코딩, read-only 조회
//! - `stats`: demo/live 집계 제공자
//! - `rewards`: 업적/NFT 보상 유도
//! - `share`: 소셜 공유 템플릿/링크
//! - `notifications`: 알림 허브
//! - `submission`: 4단계 제출 워크플로우

pub mod contract;
pub mod geo;
pub mod ipfs;
pub mod notifications;
pub mod photo;
pub mod proof;
pub mod rewards;
pub mod share;
pub mod stats;
pub mod submission;

pub use contract::{EcoTalaContract, ECO_ACTIONS};
pub use geo::GeoLocator;
pub use ipfs::{IpfsService, UploadResult};
pub use notifications::NotificationHub;
pub use stats::{ContractStatsProvider, DemoStatsProvider, StatsProvider};
pub use submission::SubmissionStore;
