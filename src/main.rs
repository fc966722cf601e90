//! EcoTala API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Client (Mobile Frontend)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health /actions /photos/* /submissions/* /stats/*     ││
//! │  │  /rewards/* /share/* /ws                                ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Services Layer                        ││
//! │  │  IpfsService  EcoTalaContract  StatsProvider            ││
//! │  │  SubmissionStore  NotificationHub                       ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//!                  │                          │
//!                  ▼                          ▼
//! ┌──────────────────────────┐  ┌──────────────────────────────┐
//! │     Pinata (IPFS pin)    │  │  EcoTala Contract (Base)     │
//! └──────────────────────────┘  └──────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 라이브러리에서 가져오기
use ecotala_api::{
    config::StatsMode,
    routes,
    services::contract::ContractConfig,
    services::ipfs::IpfsConfig,
    services::{
        ContractStatsProvider, DemoStatsProvider, EcoTalaContract, GeoLocator, IpfsService,
        NotificationHub, StatsProvider, SubmissionStore,
    },
    AppState, Config,
};

/// multipart 본문 한도: 사진 10MiB + 오버헤드
const BODY_LIMIT_BYTES: usize = 12 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,tower_http=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecotala_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🌱 Starting EcoTala API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("📋 Configuration loaded");

    // 서비스 초기화
    let geo = GeoLocator::new(config.geo_lookup_url.clone());
    let ipfs = Arc::new(IpfsService::new(
        IpfsConfig {
            api_key: config.pinata_api_key.clone(),
            secret_key: config.pinata_secret_key.clone(),
            pin_endpoint: config.pinata_pin_endpoint.clone(),
            gateway_url: config.ipfs_gateway_url.clone(),
        },
        geo,
    ));
    if config.pinning_configured() {
        tracing::info!("📌 Pinata pinning enabled");
    } else {
        tracing::info!("📌 No pinning credentials - local fingerprint mode");
    }

    let contract = Arc::new(EcoTalaContract::new(ContractConfig {
        address: config.contract_address.clone(),
        chain_id: config.chain_id,
        rpc_url: config.eth_rpc_url.clone(),
    })?);
    tracing::info!("⛓️  Contract service ready (chain {})", config.chain_id);

    // 통계 제공자 선택: live는 컨트랙트 주소가 있을 때만
    let stats: Arc<dyn StatsProvider> = match config.stats_mode {
        StatsMode::Live if contract.is_configured() => {
            tracing::info!("📊 Stats provider: live (contract reads)");
            Arc::new(ContractStatsProvider::new(contract.clone()))
        }
        StatsMode::Live => {
            tracing::warn!("📊 STATS_MODE=live but no contract address - using demo");
            Arc::new(DemoStatsProvider)
        }
        StatsMode::Demo => {
            tracing::info!("📊 Stats provider: demo");
            Arc::new(DemoStatsProvider)
        }
    };

    let notifications = Arc::new(NotificationHub::new());
    let submissions = Arc::new(SubmissionStore::new());

    // 앱 상태 구성
    let state = AppState {
        config: Arc::new(config.clone()),
        ipfs,
        contract,
        stats,
        notifications,
        submissions,
    };

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET  /health                      - 서버/구성 상태
/// GET  /actions                     - 액션 카탈로그
///
/// POST /photos                      - 사진 업로드 파이프라인
/// POST /photos/batch                - 복수 업로드
/// GET  /photos/:hash/url            - fingerprint → URL
///
/// POST /submissions                 - 제출 세션 시작
/// GET  /submissions/:id             - 세션 상태
/// POST /submissions/:id/action      - 액션 선택
/// POST /submissions/:id/photo       - 증빙 사진
/// POST /submissions/:id/confirm     - 확인 (call + proof)
/// POST /submissions/:id/back        - 뒤로
/// POST /submissions/:id/complete    - 지갑 결과 콜백
/// DEL  /submissions/:id             - 폐기
///
/// GET  /stats/user/:address         - 사용자 통계
/// GET  /stats/user/:address/actions - 히스토리
/// GET  /stats/global                - 글로벌 통계
/// GET  /stats/community             - 커뮤니티 통계
/// GET  /stats/leaderboard           - 리더보드
///
/// GET  /rewards/:address            - 업적/NFT 보상
/// POST /rewards/:address/claim/:id  - 보상 클레임
///
/// GET  /share/templates             - 공유 템플릿
/// POST /share/compose               - 공유 메시지 구성
///
/// GET  /ws                          - 알림 스트림
/// ```
fn create_router(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션에서는 특정 도메인만 허용
    // 개발 환경에서는 localhost 허용
    use tower_http::cors::AllowOrigin;

    let cors = if state.config.is_production() {
        // 프로덕션: 특정 도메인만 허용 (환경변수로 설정)
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "https://ecotala.app".to_string());
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        // 개발: 전부 허용
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))
        // Action catalog
        .route("/actions", get(routes::actions::list_actions))
        // Photo pipeline
        .route("/photos", post(routes::photos::upload_photo))
        .route("/photos/batch", post(routes::photos::upload_photos_batch))
        .route("/photos/:hash/url", get(routes::photos::resolve_photo_url))
        // Submission workflow
        .route("/submissions", post(routes::submissions::open_submission))
        .route(
            "/submissions/:id",
            get(routes::submissions::get_submission)
                .delete(routes::submissions::discard_submission),
        )
        .route("/submissions/:id/action", post(routes::submissions::select_action))
        .route("/submissions/:id/photo", post(routes::submissions::attach_photo))
        .route("/submissions/:id/confirm", post(routes::submissions::confirm_submission))
        .route("/submissions/:id/back", post(routes::submissions::go_back))
        .route("/submissions/:id/complete", post(routes::submissions::complete_submission))
        // Stats
        .route("/stats/user/:address", get(routes::stats::get_user_stats))
        .route("/stats/user/:address/actions", get(routes::stats::get_user_actions))
        .route("/stats/global", get(routes::stats::get_global_stats))
        .route("/stats/community", get(routes::stats::get_community_stats))
        .route("/stats/leaderboard", get(routes::stats::get_leaderboard))
        // Rewards
        .route("/rewards/:address", get(routes::rewards::get_rewards))
        .route("/rewards/:address/claim/:id", post(routes::rewards::claim_reward))
        // Share
        .route("/share/templates", get(routes::share::list_templates))
        .route("/share/compose", post(routes::share::compose))
        // Notifications stream
        .route("/ws", get(routes::ws::ws_handler))
        // 미들웨어
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // 상태 주입
        .with_state(state)
}
