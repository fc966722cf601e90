//! Proof Metadata Service
//!
//! 액션 종류, 사용자 주소, 사진 fingerprint, 시각, 위치를 하나의
//! 변조 감지 가능한 JSON 번들로 묶는다.
//!
//! integrity digest는 (fingerprint, 액션, 주소, 시각) 네 필드를
//! 콜론으로 이어붙인 문자열의 SHA-256이다. 네 필드 중 하나라도
//! 바뀌면 digest가 달라진다.
//!
//! 입력 검증은 하지 않음: 업스트림(validator/uploader)을 신뢰한다.

use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::services::geo::GeoCoordinate;
use crate::services::ipfs::PhotoMetadata;

/// proof 스키마 버전
pub const PROOF_VERSION: &str = "1.0";

/// 앱 식별자
pub const APP_TAG: &str = "EcoTala";

/// 체인 제출에 곁들일 증빙 번들
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofMetadata {
    pub version: String,
    pub app: String,
    pub action_type: String,
    pub user_address: String,
    pub photo_hash: String,
    /// 사진 업로드 시각 (epoch ms)
    pub timestamp: i64,
    pub file_metadata: FileMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoCoordinate>,
    /// hex SHA-256 integrity digest
    pub integrity: String,
}

/// 파일 기술 정보 (proof에 포함되는 부분집합)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
}

/// proof 번들 조립 후 JSON 문자열로 직렬화
pub fn generate_proof_metadata(
    photo: &PhotoMetadata,
    action_type: &str,
    user_address: &str,
) -> Result<String> {
    let proof = build_proof(photo, action_type, user_address);
    Ok(serde_json::to_string(&proof)?)
}

/// proof 번들 조립 (직렬화 전 구조체)
pub fn build_proof(photo: &PhotoMetadata, action_type: &str, user_address: &str) -> ProofMetadata {
    ProofMetadata {
        version: PROOF_VERSION.to_string(),
        app: APP_TAG.to_string(),
        action_type: action_type.to_string(),
        user_address: user_address.to_string(),
        photo_hash: photo.hash.clone(),
        timestamp: photo.timestamp,
        file_metadata: FileMetadata {
            file_name: photo.file_name.clone(),
            file_size: photo.file_size,
            mime_type: photo.mime_type.clone(),
        },
        geo_location: photo.geo_location,
        integrity: integrity_hash(&photo.hash, action_type, user_address, photo.timestamp),
    }
}

/// integrity digest 계산
///
/// SHA-256("<hash>:<actionType>:<userAddress>:<timestamp>") → hex
pub fn integrity_hash(
    photo_hash: &str,
    action_type: &str,
    user_address: &str,
    timestamp: i64,
) -> String {
    let data = format!("{}:{}:{}:{}", photo_hash, action_type, user_address, timestamp);
    hex::encode(Sha256::digest(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(hash: &str, timestamp: i64) -> PhotoMetadata {
        PhotoMetadata {
            hash: hash.to_string(),
            file_name: "proof.jpg".to_string(),
            file_size: 1024,
            mime_type: "image/jpeg".to_string(),
            timestamp,
            geo_location: None,
        }
    }

    #[test]
    fn test_integrity_hash_is_deterministic() {
        let expected = hex::encode(Sha256::digest("abc:Plant Tree:0xdead:1000".as_bytes()));
        assert_eq!(integrity_hash("abc", "Plant Tree", "0xdead", 1000), expected);
        // 재호출해도 동일
        assert_eq!(integrity_hash("abc", "Plant Tree", "0xdead", 1000), expected);
    }

    #[test]
    fn test_integrity_hash_changes_with_any_field() {
        let base = integrity_hash("abc", "Plant Tree", "0xdead", 1000);
        assert_ne!(integrity_hash("abd", "Plant Tree", "0xdead", 1000), base);
        assert_ne!(integrity_hash("abc", "Carpool", "0xdead", 1000), base);
        assert_ne!(integrity_hash("abc", "Plant Tree", "0xbeef", 1000), base);
        assert_ne!(integrity_hash("abc", "Plant Tree", "0xdead", 1001), base);
    }

    #[test]
    fn test_proof_json_shape() {
        let json = generate_proof_metadata(&photo("abc", 1000), "Plant Tree", "0xdead").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["app"], "EcoTala");
        assert_eq!(value["actionType"], "Plant Tree");
        assert_eq!(value["userAddress"], "0xdead");
        assert_eq!(value["photoHash"], "abc");
        assert_eq!(value["timestamp"], 1000);
        assert_eq!(value["fileMetadata"]["fileName"], "proof.jpg");
        assert_eq!(value["fileMetadata"]["fileSize"], 1024);
        assert_eq!(value["fileMetadata"]["mimeType"], "image/jpeg");
        // geo 없으면 키 자체가 생략됨
        assert!(value.get("geoLocation").is_none());

        let expected = hex::encode(Sha256::digest("abc:Plant Tree:0xdead:1000".as_bytes()));
        assert_eq!(value["integrity"], expected.as_str());
    }

    #[test]
    fn test_proof_includes_geo_when_present() {
        let mut p = photo("abc", 1000);
        p.geo_location = Some(crate::services::geo::GeoCoordinate {
            latitude: 14.5995,
            longitude: 120.9842,
        });
        let json = generate_proof_metadata(&p, "Plant Tree", "0xdead").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["geoLocation"]["latitude"], 14.5995);
        assert_eq!(value["geoLocation"]["longitude"], 120.9842);
    }
}
