//! # 역할 스토어 구현
//!
//! 독립된 역할 문서의 생성/조회/수정/삭제를 담당합니다.
//! 사용자 스토어는 역할 할당 시 이 스토어로 역할의 존재 여부를 확인합니다.

use std::sync::Arc;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::{Claim, Document, new_document_id, roles::Role};
use crate::errors::{StoreError, StoreResult};
use crate::repositories::documents::{DocumentCollection, DocumentRepository, IndexSpec};
use crate::repositories::query::{Predicate, role_fields};

/// 역할 컬렉션 인덱스
const ROLE_INDEXES: &[IndexSpec] = &[IndexSpec {
    name: "normalized_name",
    keys: &[role_fields::NORMALIZED_NAME],
}];

/// 역할 애그리거트 스토어
#[derive(Clone)]
pub struct RoleStore {
    repo: DocumentRepository<Role>,
}

impl RoleStore {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            repo: DocumentRepository::new(collection),
        }
    }

    /// 새 역할 저장
    ///
    /// ID가 비어 있으면 새로 할당합니다. 같은 ID가 있으면 `Conflict`.
    ///
    /// 저장에 실패하면 새로 할당한 ID는 되돌립니다.
    pub async fn create(&self, role: &mut Role, cancel: &CancellationToken) -> StoreResult<()> {
        let assigned = role.id.is_none();
        if assigned {
            role.set_id(new_document_id());
        }

        let result = self.repo.create(role, cancel).await;
        if assigned && result.is_err() {
            role.id = None;
        }
        result
    }

    pub async fn find_by_id(&self, id: &str, cancel: &CancellationToken) -> StoreResult<Role> {
        self.repo.fetch(id, cancel).await
    }

    /// 정규화된 이름으로 역할 조회
    ///
    /// 같은 이름의 역할이 여러 개면 저장 순서상 첫 번째를 반환합니다.
    pub async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Role> {
        debug!("역할 조회: normalizedName={}", normalized_name);

        self.repo
            .find_first(&Predicate::by_normalized_role_name(normalized_name), cancel)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "정규화된 이름이 {}인 역할을 찾을 수 없습니다",
                    normalized_name
                ))
            })
    }

    /// 모든 역할 (저장 순서)
    pub async fn list_all(&self, cancel: &CancellationToken) -> StoreResult<Vec<Role>> {
        self.repo.find_all(&Predicate::All, cancel).await
    }

    /// 변경된 역할 저장 (버전 토큰 검사)
    ///
    /// 이름을 바꿔도 사용자 문서의 역할 스냅샷은 갱신되지 않습니다.
    pub async fn update(&self, role: &mut Role, cancel: &CancellationToken) -> StoreResult<()> {
        self.repo.replace(role, cancel).await
    }

    /// 역할 삭제 (버전 토큰 검사)
    ///
    /// 사용자 문서에 남은 스냅샷은 정리하지 않습니다.
    pub async fn delete(&self, role: &Role, cancel: &CancellationToken) -> StoreResult<()> {
        self.repo.delete(role, cancel).await
    }

    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        self.repo.ensure_indexes(ROLE_INDEXES).await
    }

    // --- 메모리 상의 애그리거트 연산 ---

    pub fn set_role_name(&self, role: &mut Role, name: Option<String>) {
        role.name = name;
    }

    pub fn set_normalized_role_name(&self, role: &mut Role, normalized_name: Option<String>) {
        role.normalized_name = normalized_name;
    }

    pub fn get_claims(&self, role: &Role) -> Vec<Claim> {
        role.claims.clone()
    }

    pub fn add_claim(&self, role: &mut Role, claim: Claim) {
        role.add_claim(claim);
    }

    pub fn remove_claim(&self, role: &mut Role, claim: &Claim) {
        role.remove_claim(claim);
    }
}
