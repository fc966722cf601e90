//! IPFS Upload Service
//!
//! 사진을 content-addressed 스토리지에 올리고 fingerprint를 얻는다.
//!
//! # Interview Q&A
//!
//! Q: 왜 사진 원본을 체인에 올리지 않고 IPFS를 쓰는가?
//! A: 온체인 스토리지는 바이트당 비용이 지나치게 큼
//!    - 체인에는 content fingerprint(CID)만 기록
//!    - 파일 자체는 pinning 서비스(Pinata)가 보관
//!    - fingerprint만 있으면 누구나 게이트웨이로 검증 가능
//!
//! Q: Pinata 자격증명이 없으면?
//! A: 로컬 fingerprint로 폴백
//!    - SHA-256 digest의 앞 16 hex + 업로드 시각으로 구성
//!    - `local_` 접두사로 진짜 CID와 구분 (다운스트림에서
//!      게이트웨이 조회 불가 표시를 띄울 수 있도록)
//!
//! Q: 업로드 재시도 정책은?
//! A: 없음. 실패는 결과 플래그로 변환되고 사용자가 사진 단계를
//!    다시 트리거해야 함. 파이프라인 어디에서도 예외를 던지지 않음.

use chrono::Utc;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::services::geo::{GeoCoordinate, GeoLocator};
use crate::services::photo::{compress_image, PhotoFile};

/// 로컬 폴백 fingerprint 접두사
pub const LOCAL_HASH_PREFIX: &str = "local_";

/// 업로드된 사진의 기술 메타데이터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    /// content fingerprint (업로드 완료 전에는 빈 문자열)
    pub hash: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    /// 업로드 시각 (epoch ms)
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoCoordinate>,
}

/// 업로드 시도 한 건의 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PhotoMetadata>,
}

impl UploadResult {
    fn ok(hash: String, metadata: PhotoMetadata) -> Self {
        Self {
            success: true,
            hash: Some(hash),
            error: None,
            metadata: Some(metadata),
        }
    }

    fn failure(error: String) -> Self {
        Self {
            success: false,
            hash: None,
            error: Some(error),
            metadata: None,
        }
    }
}

/// Pinata pinFileToIPFS 성공 응답
///
/// PinSize/Timestamp 등 다른 필드는 사용하지 않음
#[derive(Debug, Deserialize)]
struct PinataPinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// IPFS 연동 설정
#[derive(Debug, Clone)]
pub struct IpfsConfig {
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub pin_endpoint: String,
    pub gateway_url: String,
}

/// IPFS 업로드 서비스
///
/// 압축 → 위치 조회 → 원격 pin 또는 로컬 fingerprint 순으로
/// 업로드 파이프라인 전체를 담당한다.
pub struct IpfsService {
    config: IpfsConfig,
    geo: GeoLocator,
    client: reqwest::Client,
}

impl IpfsService {
    pub fn new(config: IpfsConfig, geo: GeoLocator) -> Self {
        Self {
            config,
            geo,
            client: reqwest::Client::new(),
        }
    }

    /// 사진 업로드
    ///
    /// # Flow
    ///
    /// 1. 압축 (실패 시 원본 유지)
    /// 2. 위치 조회 (best effort)
    /// 3. 자격증명 있으면 Pinata에 pin → CID 사용
    /// 4. 없거나 HTTP 비성공이면 로컬 fingerprint 생성
    /// 5. 전송/파싱 에러는 `{success:false}` 결과로 변환
    pub async fn upload_to_ipfs(&self, file: &PhotoFile) -> UploadResult {
        let compressed = compress_image(file);
        let geo = self.geo.locate().await;

        let timestamp = Utc::now().timestamp_millis();
        let mut metadata = PhotoMetadata {
            hash: String::new(),
            file_name: compressed.file_name.clone(),
            file_size: compressed.size() as u64,
            mime_type: compressed.content_type.clone(),
            timestamp,
            geo_location: geo,
        };

        if let (Some(key), Some(secret)) =
            (self.config.api_key.clone(), self.config.secret_key.clone())
        {
            match self.pin_to_remote(&compressed, &metadata, &key, &secret).await {
                Ok(Some(ipfs_hash)) => {
                    metadata.hash = ipfs_hash.clone();
                    tracing::info!("Photo pinned to IPFS: {}", ipfs_hash);
                    return UploadResult::ok(ipfs_hash, metadata);
                }
                // HTTP 비성공 → 로컬 폴백으로 계속
                Ok(None) => {}
                Err(err) => {
                    tracing::error!("IPFS upload error: {:?}", err);
                    return UploadResult::failure(err.to_string());
                }
            }
        }

        let local_hash = local_fingerprint(&compressed.data, timestamp);
        metadata.hash = local_hash.clone();
        tracing::info!("Photo fingerprinted locally: {}", local_hash);
        UploadResult::ok(local_hash, metadata)
    }

    /// Pinata에 multipart POST
    ///
    /// Ok(Some(cid)): pin 성공 / Ok(None): HTTP 비성공 (폴백 대상)
    /// Err: 전송 또는 응답 파싱 실패
    async fn pin_to_remote(
        &self,
        file: &PhotoFile,
        metadata: &PhotoMetadata,
        api_key: &str,
        secret_key: &str,
    ) -> anyhow::Result<Option<String>> {
        let part = multipart::Part::bytes(file.data.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;

        // 검색용 태그 사이드카
        let pinata_metadata = serde_json::json!({
            "name": format!("EcoTala_{}", metadata.timestamp),
            "keyvalues": {
                "app": "EcoTala",
                "timestamp": metadata.timestamp.to_string(),
                "fileSize": metadata.file_size.to_string(),
            }
        });

        let form = multipart::Form::new()
            .part("file", part)
            .text("pinataMetadata", pinata_metadata.to_string());

        let response = self
            .client
            .post(&self.config.pin_endpoint)
            .header("pinata_api_key", api_key)
            .header("pinata_secret_api_key", secret_key)
            .multipart(form)
            .send()
            .await?;

        if response.status().is_success() {
            let body: PinataPinResponse = response.json().await?;
            Ok(Some(body.ipfs_hash))
        } else {
            tracing::warn!(
                "Pinata pin returned {}, falling back to local fingerprint",
                response.status()
            );
            Ok(None)
        }
    }

    /// 여러 사진 동시 업로드
    ///
    /// 입력 순서대로 결과를 돌려주며, 한 건의 실패가 나머지를
    /// 취소하지 않는다.
    pub async fn batch_upload(&self, files: &[PhotoFile]) -> Vec<UploadResult> {
        let uploads = files.iter().map(|file| self.upload_to_ipfs(file));
        futures_util::future::join_all(uploads).await
    }

    /// fingerprint → 표시용 URL
    ///
    /// 로컬 fingerprint는 게이트웨이에서 조회할 수 없으므로
    /// fingerprint 텍스트를 담은 placeholder SVG data URI를 만든다.
    pub fn get_ipfs_url(&self, hash: &str) -> String {
        if hash.starts_with(LOCAL_HASH_PREFIX) {
            let truncated: String = hash.chars().take(20).collect();
            let svg = format!(
                concat!(
                    r##"<svg width="200" height="200" xmlns="http://www.w3.org/2000/svg">"##,
                    r##"<rect width="200" height="200" fill="#e5e5e5"/>"##,
                    r##"<text x="100" y="100" text-anchor="middle" dy=".3em" font-family="Arial" font-size="14" fill="#666">Demo Photo</text>"##,
                    r##"<text x="100" y="120" text-anchor="middle" dy=".3em" font-family="Arial" font-size="10" fill="#999">{}...</text>"##,
                    r##"</svg>"##
                ),
                truncated
            );
            format!("data:image/svg+xml;base64,{}", BASE64.encode(svg))
        } else {
            format!(
                "{}/{}",
                self.config.gateway_url.trim_end_matches('/'),
                hash
            )
        }
    }
}

/// 로컬 fingerprint 생성
///
/// SHA-256의 앞 16 hex + 타임스탬프. 같은 바이트라도 시각이 다르면
/// fingerprint는 달라지지만 digest 접두사는 동일하다.
fn local_fingerprint(data: &[u8], timestamp: i64) -> String {
    let digest = Sha256::digest(data);
    let hash_hex = hex::encode(digest);
    format!("{}{}_{}", LOCAL_HASH_PREFIX, &hash_hex[..16], timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_service() -> IpfsService {
        IpfsService::new(
            IpfsConfig {
                api_key: None,
                secret_key: None,
                pin_endpoint: "https://api.pinata.cloud/pinning/pinFileToIPFS".to_string(),
                gateway_url: "https://gateway.pinata.cloud/ipfs".to_string(),
            },
            GeoLocator::new(None),
        )
    }

    #[tokio::test]
    async fn test_upload_without_credentials_uses_local_fingerprint() {
        let service = local_service();
        let data = vec![42u8; 256];
        let file = PhotoFile::new(data.clone(), "proof.jpg", "image/jpeg");

        let result = service.upload_to_ipfs(&file).await;
        assert!(result.success);

        let hash = result.hash.unwrap();
        assert!(hash.starts_with(LOCAL_HASH_PREFIX));

        // local_<16 hex>_<timestamp> 형식 + digest 접두사 재계산 일치
        // (깨진 JPEG 바이트라 압축은 원본을 유지함)
        let rest = hash.strip_prefix(LOCAL_HASH_PREFIX).unwrap();
        let (prefix, ts) = rest.split_once('_').unwrap();
        assert_eq!(prefix.len(), 16);
        assert!(prefix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(ts.parse::<i64>().is_ok());

        let expected = hex::encode(Sha256::digest(&data));
        assert_eq!(prefix, &expected[..16]);

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.hash, hash);
        assert_eq!(metadata.file_size, 256);
        assert_eq!(metadata.mime_type, "image/jpeg");
        assert!(metadata.geo_location.is_none());
    }

    #[tokio::test]
    async fn test_identical_bytes_share_digest_prefix() {
        let service = local_service();
        let file = PhotoFile::new(vec![7u8; 128], "a.jpg", "image/jpeg");

        let first = service.upload_to_ipfs(&file).await.hash.unwrap();
        let second = service.upload_to_ipfs(&file).await.hash.unwrap();

        let prefix = |h: &str| h[LOCAL_HASH_PREFIX.len()..LOCAL_HASH_PREFIX.len() + 16].to_string();
        assert_eq!(prefix(&first), prefix(&second));
    }

    #[tokio::test]
    async fn test_batch_upload_preserves_order() {
        let service = local_service();
        let files = vec![
            PhotoFile::new(vec![1u8; 64], "a.jpg", "image/jpeg"),
            PhotoFile::new(vec![2u8; 64], "b.jpg", "image/jpeg"),
        ];

        let results = service.batch_upload(&files).await;
        assert_eq!(results.len(), 2);

        for (file, result) in files.iter().zip(&results) {
            assert!(result.success);
            let expected = hex::encode(Sha256::digest(&file.data));
            let hash = result.hash.as_ref().unwrap();
            assert_eq!(&hash[LOCAL_HASH_PREFIX.len()..LOCAL_HASH_PREFIX.len() + 16], &expected[..16]);
        }
    }

    #[test]
    fn test_local_hash_resolves_to_data_uri() {
        let service = local_service();
        let url = service.get_ipfs_url("local_0123456789abcdef_1700000000000");
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_remote_hash_resolves_to_gateway_url() {
        let service = local_service();
        let url = service.get_ipfs_url("QmTestHash123");
        assert_eq!(url, "https://gateway.pinata.cloud/ipfs/QmTestHash123");
    }
}
