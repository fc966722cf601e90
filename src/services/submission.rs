//! Action Submission Workflow
//!
//! 4단계 제출 워크플로우: select → photo → confirm → submit.
//!
//! # Design Decision
//!
//! 단계를 문자열이 아니라 데이터를 가진 tagged enum으로 표현:
//! - confirm 단계는 업로드 성공(PhotoMetadata)을 들고 있어야만 존재
//! - submit 단계는 인코딩된 호출과 proof를 들고 있어야만 존재
//! 불가능한 상태(사진 없는 confirm 등)가 타입상 만들어지지 않는다.
//!
//! 세션은 메모리에만 존재하며 닫히면 모든 진행 상태가 버려진다.
//! 트랜잭션 성공/실패는 외부 지갑 콜라보레이터의 콜백으로 전달되고,
//! 실패 시 롤백은 없다 (로컬에 커밋된 것이 없기 때문).

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::contract::{CallRequest, EcoAction};
use crate::services::ipfs::{PhotoMetadata, UploadResult};

/// 워크플로우 단계 (데이터 포함 variant)
#[derive(Debug, Clone)]
pub enum SubmissionStep {
    /// 액션 선택 대기
    Select,
    /// 증빙 사진 대기
    Photo { action: &'static EcoAction },
    /// 확인 대기 (업로드 완료)
    Confirm {
        action: &'static EcoAction,
        photo: PhotoMetadata,
    },
    /// 외부 지갑 콜라보레이터에 제출 중
    Submit {
        action: &'static EcoAction,
        photo: PhotoMetadata,
        call: CallRequest,
        proof: String,
    },
}

impl SubmissionStep {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionStep::Select => "select",
            SubmissionStep::Photo { .. } => "photo",
            SubmissionStep::Confirm { .. } => "confirm",
            SubmissionStep::Submit { .. } => "submit",
        }
    }
}

/// 워크플로우 이벤트
#[derive(Debug, Clone)]
pub enum SubmissionEvent {
    /// 카탈로그 액션 선택
    SelectAction(&'static EcoAction),
    /// 사진 업로드 성공
    PhotoUploaded(PhotoMetadata),
    /// 사용자 확인 (호출 데이터 + proof 준비됨)
    ConfirmSubmission { call: CallRequest, proof: String },
    /// 한 단계 뒤로
    Back,
    /// 외부 콜라보레이터: 트랜잭션 성공
    TransactionSucceeded,
    /// 외부 콜라보레이터: 트랜잭션 실패
    TransactionFailed(String),
}

impl SubmissionEvent {
    fn name(&self) -> &'static str {
        match self {
            SubmissionEvent::SelectAction(_) => "select action",
            SubmissionEvent::PhotoUploaded(_) => "attach photo",
            SubmissionEvent::ConfirmSubmission { .. } => "confirm",
            SubmissionEvent::Back => "go back",
            SubmissionEvent::TransactionSucceeded => "complete",
            SubmissionEvent::TransactionFailed(_) => "fail",
        }
    }
}

/// 전이 결과
#[derive(Debug)]
pub enum Transition {
    /// 다음 단계로
    Next(SubmissionStep),
    /// 워크플로우 종료 (성공 제출 후 초기화)
    Closed,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Submission session not found")]
    NotFound,

    #[error("Cannot {event} from step '{from}'")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    #[error("Upload was not successful: {0}")]
    UploadNotSuccessful(String),
}

/// 단계 전이 (순수 함수, 전수 매칭)
pub fn apply(step: SubmissionStep, event: SubmissionEvent) -> Result<Transition, SubmissionError> {
    use SubmissionEvent as E;
    use SubmissionStep as S;

    let invalid = |from: &SubmissionStep, event: &SubmissionEvent| SubmissionError::InvalidTransition {
        from: from.name(),
        event: event.name(),
    };

    match (step, event) {
        // 전진
        (S::Select, E::SelectAction(action)) => Ok(Transition::Next(S::Photo { action })),
        (S::Photo { action }, E::PhotoUploaded(photo)) => {
            Ok(Transition::Next(S::Confirm { action, photo }))
        }
        (S::Confirm { action, photo }, E::ConfirmSubmission { call, proof }) => {
            Ok(Transition::Next(S::Submit {
                action,
                photo,
                call,
                proof,
            }))
        }

        // 후진
        (S::Photo { .. }, E::Back) => Ok(Transition::Next(S::Select)),
        (S::Confirm { action, .. }, E::Back) => Ok(Transition::Next(S::Photo { action })),
        (S::Submit { action, photo, .. }, E::Back) => {
            Ok(Transition::Next(S::Confirm { action, photo }))
        }

        // 외부 콜백
        (S::Submit { .. }, E::TransactionSucceeded) => Ok(Transition::Closed),
        (step @ S::Submit { .. }, E::TransactionFailed(_)) => {
            // 실패는 알림으로만 전달되고 단계는 유지. 사용자가
            // 재시도하거나 뒤로 갈 수 있다
            Ok(Transition::Next(step))
        }

        // 그 외 전부 거부
        (step, event) => Err(invalid(&step, &event)),
    }
}

/// 진행 중 제출 세션
#[derive(Debug, Clone)]
pub struct SubmissionSession {
    pub id: Uuid,
    pub user_address: String,
    pub step: SubmissionStep,
    pub created_at: i64,
    pub updated_at: i64,
}

/// 세션 저장소 (메모리 전용)
pub struct SubmissionStore {
    sessions: RwLock<HashMap<Uuid, SubmissionSession>>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// 새 세션 시작 (select 단계)
    pub async fn open(&self, user_address: String) -> SubmissionSession {
        let now = Utc::now().timestamp_millis();
        let session = SubmissionSession {
            id: Uuid::new_v4(),
            user_address,
            step: SubmissionStep::Select,
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<SubmissionSession> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    /// 이벤트 적용
    ///
    /// Ok(None)은 워크플로우가 종료되어 세션이 제거됐음을 뜻한다.
    pub async fn apply_event(
        &self,
        id: Uuid,
        event: SubmissionEvent,
    ) -> Result<Option<SubmissionSession>, SubmissionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SubmissionError::NotFound)?;

        match apply(session.step.clone(), event)? {
            Transition::Next(step) => {
                session.step = step;
                session.updated_at = Utc::now().timestamp_millis();
                Ok(Some(session.clone()))
            }
            Transition::Closed => {
                sessions.remove(&id);
                Ok(None)
            }
        }
    }

    /// 업로드 결과를 사진 이벤트로 변환해 적용
    ///
    /// 업로드가 실패였으면 세션은 photo 단계에 머문다.
    pub async fn attach_upload(
        &self,
        id: Uuid,
        upload: &UploadResult,
    ) -> Result<SubmissionSession, SubmissionError> {
        if !upload.success {
            return Err(SubmissionError::UploadNotSuccessful(
                upload
                    .error
                    .clone()
                    .unwrap_or_else(|| "Upload failed".to_string()),
            ));
        }

        let metadata = upload
            .metadata
            .clone()
            .ok_or_else(|| SubmissionError::UploadNotSuccessful("Missing metadata".to_string()))?;

        let session = self
            .apply_event(id, SubmissionEvent::PhotoUploaded(metadata))
            .await?;

        // PhotoUploaded는 닫힘으로 이어지지 않음
        session.ok_or(SubmissionError::NotFound)
    }

    /// 세션 폐기 (모든 진행 상태 버림)
    pub async fn discard(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id).is_some()
    }

    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

impl Default for SubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::contract::{find_action, ContractConfig, EcoTalaContract};
    use crate::services::geo::GeoLocator;
    use crate::services::ipfs::{IpfsConfig, IpfsService, LOCAL_HASH_PREFIX};
    use crate::services::photo::{validate_photo_file, PhotoFile};
    use crate::services::proof::generate_proof_metadata;

    const USER: &str = "0x1234567890123456789012345678901234567890";

    fn photo_metadata(hash: &str) -> PhotoMetadata {
        PhotoMetadata {
            hash: hash.to_string(),
            file_name: "proof.jpg".to_string(),
            file_size: 100,
            mime_type: "image/jpeg".to_string(),
            timestamp: 1000,
            geo_location: None,
        }
    }

    fn call_request() -> CallRequest {
        CallRequest {
            to: USER.to_string(),
            data: "0xdeadbeef".to_string(),
            chain_id: 84532,
        }
    }

    #[tokio::test]
    async fn test_happy_path_resets_and_closes() {
        let store = SubmissionStore::new();
        let session = store.open(USER.to_string()).await;
        assert_eq!(session.step.name(), "select");

        let action = find_action("Plant Tree").unwrap();
        let s = store
            .apply_event(session.id, SubmissionEvent::SelectAction(action))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s.step.name(), "photo");

        let s = store
            .apply_event(
                session.id,
                SubmissionEvent::PhotoUploaded(photo_metadata("local_abc_1")),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s.step.name(), "confirm");

        let s = store
            .apply_event(
                session.id,
                SubmissionEvent::ConfirmSubmission {
                    call: call_request(),
                    proof: "{}".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s.step.name(), "submit");

        // 성공 콜백 → 세션 종료
        let closed = store
            .apply_event(session.id, SubmissionEvent::TransactionSucceeded)
            .await
            .unwrap();
        assert!(closed.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_confirm_unreachable_without_upload() {
        let store = SubmissionStore::new();
        let session = store.open(USER.to_string()).await;
        let action = find_action("Carpool").unwrap();

        store
            .apply_event(session.id, SubmissionEvent::SelectAction(action))
            .await
            .unwrap();

        // photo 단계에서 바로 confirm 시도 → 거부
        let err = store
            .apply_event(
                session.id,
                SubmissionEvent::ConfirmSubmission {
                    call: call_request(),
                    proof: "{}".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidTransition { from: "photo", .. }));

        // 실패한 업로드도 confirm으로 이어지지 않음
        let failed = UploadResult {
            success: false,
            hash: None,
            error: Some("network down".to_string()),
            metadata: None,
        };
        let err = store.attach_upload(session.id, &failed).await.unwrap_err();
        assert!(matches!(err, SubmissionError::UploadNotSuccessful(_)));
        assert_eq!(
            store.get(session.id).await.unwrap().step.name(),
            "photo"
        );
    }

    #[tokio::test]
    async fn test_backward_transitions() {
        let store = SubmissionStore::new();
        let session = store.open(USER.to_string()).await;
        let action = find_action("Solar Energy").unwrap();

        store
            .apply_event(session.id, SubmissionEvent::SelectAction(action))
            .await
            .unwrap();
        store
            .apply_event(
                session.id,
                SubmissionEvent::PhotoUploaded(photo_metadata("local_x_1")),
            )
            .await
            .unwrap();
        store
            .apply_event(
                session.id,
                SubmissionEvent::ConfirmSubmission {
                    call: call_request(),
                    proof: "{}".to_string(),
                },
            )
            .await
            .unwrap();

        // submit → confirm → photo → select
        for expected in ["confirm", "photo", "select"] {
            let s = store
                .apply_event(session.id, SubmissionEvent::Back)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(s.step.name(), expected);
        }

        // select에서 더 뒤로는 불가
        assert!(store
            .apply_event(session.id, SubmissionEvent::Back)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_transaction_failure_keeps_submit_step() {
        let store = SubmissionStore::new();
        let session = store.open(USER.to_string()).await;
        let action = find_action("Reusable Cup").unwrap();

        store
            .apply_event(session.id, SubmissionEvent::SelectAction(action))
            .await
            .unwrap();
        store
            .apply_event(
                session.id,
                SubmissionEvent::PhotoUploaded(photo_metadata("local_x_1")),
            )
            .await
            .unwrap();
        store
            .apply_event(
                session.id,
                SubmissionEvent::ConfirmSubmission {
                    call: call_request(),
                    proof: "{}".to_string(),
                },
            )
            .await
            .unwrap();

        let s = store
            .apply_event(
                session.id,
                SubmissionEvent::TransactionFailed("reverted".to_string()),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s.step.name(), "submit");
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_discard_drops_all_state() {
        let store = SubmissionStore::new();
        let session = store.open(USER.to_string()).await;
        assert!(store.discard(session.id).await);
        assert!(!store.discard(session.id).await);
        assert!(store.get(session.id).await.is_none());
    }

    /// End-to-end: Plant Tree + 2MB JPEG, pinning 자격증명 없음
    #[tokio::test]
    async fn test_end_to_end_local_mode_submission() {
        let ipfs = IpfsService::new(
            IpfsConfig {
                api_key: None,
                secret_key: None,
                pin_endpoint: "https://api.pinata.cloud/pinning/pinFileToIPFS".to_string(),
                gateway_url: "https://gateway.pinata.cloud/ipfs".to_string(),
            },
            GeoLocator::new(None),
        );
        let contract = EcoTalaContract::new(ContractConfig {
            address: Some("0x1111111111111111111111111111111111111111".to_string()),
            chain_id: 84532,
            rpc_url: "https://sepolia.base.org".to_string(),
        })
        .unwrap();
        let store = SubmissionStore::new();

        // select: Plant Tree (20 points)
        let session = store.open(USER.to_string()).await;
        let action = find_action("Plant Tree").unwrap();
        assert_eq!(action.points, 20);
        store
            .apply_event(session.id, SubmissionEvent::SelectAction(action))
            .await
            .unwrap();

        // photo: 2MB JPEG → 검증 통과 → 로컬 fingerprint 업로드
        let file = PhotoFile::new(vec![0xABu8; 2 * 1024 * 1024], "tree.jpg", "image/jpeg");
        validate_photo_file(&file).unwrap();

        let upload = ipfs.upload_to_ipfs(&file).await;
        assert!(upload.success);
        let hash = upload.hash.clone().unwrap();
        assert!(hash.starts_with(LOCAL_HASH_PREFIX));

        let s = store.attach_upload(session.id, &upload).await.unwrap();
        assert_eq!(s.step.name(), "confirm");

        // confirm → submit: 호출 데이터와 proof 조립
        let metadata = upload.metadata.unwrap();
        let proof = generate_proof_metadata(&metadata, action.name, USER).unwrap();
        let call = contract.log_action_call(action.name, &hash).unwrap();

        let s = store
            .apply_event(
                session.id,
                SubmissionEvent::ConfirmSubmission {
                    call: call.clone(),
                    proof,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s.step.name(), "submit");

        // 호출 인자가 ("Plant Tree", local fingerprint)로 디코딩되는지
        let raw = hex::decode(call.data.trim_start_matches("0x")).unwrap();
        let decoded_abi = ethers::abi::parse_abi(&[
            "function logAction(string actionType, string photoHash)",
        ])
        .unwrap();
        let base = ethers::contract::BaseContract::from(decoded_abi);
        let (decoded_action, decoded_hash): (String, String) =
            base.decode("logAction", raw).unwrap();
        assert_eq!(decoded_action, "Plant Tree");
        assert_eq!(decoded_hash, hash);
    }
}
