//! Geolocation Service
//!
//! 사진에 첨부할 대략적 위치를 조회하는 best-effort 서비스.
//!
//! # Design Decision
//!
//! 위치는 보조 정보일 뿐 필수가 아님:
//! - 조회 실패/타임아웃/엔드포인트 미설정 → None (에러 전파 없음)
//! - 5초 타임아웃으로 업로드 파이프라인을 붙잡지 않음

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 위치 조회 타임아웃 (초)
pub const GEO_TIMEOUT_SECS: u64 = 5;

/// 위도/경도 쌍
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// 위치 조회 엔드포인트 응답
#[derive(Debug, Deserialize)]
struct GeoLookupResponse {
    latitude: f64,
    longitude: f64,
}

/// 위치 조회 서비스
///
/// 엔드포인트가 설정되지 않았으면 기능 없음으로 간주하고
/// 항상 None을 반환한다.
pub struct GeoLocator {
    lookup_url: Option<String>,
    client: reqwest::Client,
}

impl GeoLocator {
    pub fn new(lookup_url: Option<String>) -> Self {
        Self {
            lookup_url,
            client: reqwest::Client::new(),
        }
    }

    /// 현재 위치 조회 (best effort)
    ///
    /// 고정밀 힌트와 함께 엔드포인트를 호출하고, 어떤 실패든
    /// None으로 수렴시킨다.
    pub async fn locate(&self) -> Option<GeoCoordinate> {
        let url = self.lookup_url.as_ref()?;

        let response = self
            .client
            .get(url)
            .query(&[("accuracy", "high")])
            .timeout(Duration::from_secs(GEO_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<GeoLookupResponse>().await {
                    Ok(body) => Some(GeoCoordinate {
                        latitude: body.latitude,
                        longitude: body.longitude,
                    }),
                    Err(err) => {
                        tracing::debug!("Geolocation response parse failed: {}", err);
                        None
                    }
                }
            }
            Ok(resp) => {
                tracing::debug!("Geolocation lookup returned {}", resp.status());
                None
            }
            Err(err) => {
                // 타임아웃 포함
                tracing::debug!("Geolocation lookup failed: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_locate_without_endpoint_resolves_none() {
        let locator = GeoLocator::new(None);
        assert_eq!(locator.locate().await, None);
    }

    #[tokio::test]
    async fn test_locate_unreachable_endpoint_resolves_none() {
        // 연결 불가한 포트 → 에러가 아니라 None
        let locator = GeoLocator::new(Some("http://127.0.0.1:1/geo".to_string()));
        assert_eq!(locator.locate().await, None);
    }
}
