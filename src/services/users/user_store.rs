//! # 사용자 스토어 구현
//!
//! identity 프레임워크가 필요로 하는 사용자 조회/변경 연산을 모두 제공합니다.
//!
//! ## 두 단계 변경
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │  메모리 상의 변경     │      │  명시적 저장          │
//! │  (동기, 부수효과 없음)│ ───▶ │  update(&mut user)    │
//! │  set_*, add_*, ...    │      │  버전 토큰 검사       │
//! └──────────────────────┘      └──────────────────────┘
//! ```
//!
//! `add_to_role`만 예외적으로 비동기입니다. 역할 문서의 존재를 확인해야 하기
//! 때문이며, 그 경우에도 결과는 메모리 상의 애그리거트에만 반영됩니다.
//!
//! ## 역할 멤버십 정합성
//!
//! 사용자 문서는 역할을 참조하지 않고 `(roleId, roleName)` 스냅샷을 복사해 둡니다.
//! 할당 시점에만 역할의 존재를 검사하며, 이후 역할이 삭제되어도 스냅샷은 남습니다.
//! 이 경우 사용자는 "이름으로 더 이상 찾을 수 없는 역할"을 가진 것처럼 보이며,
//! 에러로 취급하지 않습니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::domain::entities::{
    Claim, Document, new_document_id,
    users::{User, UserLoginInfo},
};
use crate::errors::{StoreError, StoreResult};
use crate::repositories::documents::{DocumentCollection, DocumentRepository, IndexSpec};
use crate::repositories::query::{Predicate, user_fields};
use crate::services::roles::RoleStore;

/// 사용자 컬렉션 인덱스 (유니크 아님)
const USER_INDEXES: &[IndexSpec] = &[
    IndexSpec {
        name: "normalized_user_name",
        keys: &[user_fields::NORMALIZED_USER_NAME],
    },
    IndexSpec {
        name: "normalized_email",
        keys: &[user_fields::NORMALIZED_EMAIL],
    },
    IndexSpec {
        name: "logins",
        keys: &["logins.loginProvider", "logins.providerKey"],
    },
    IndexSpec {
        name: "claims",
        keys: &["claims.type", "claims.value"],
    },
    IndexSpec {
        name: "role_names",
        keys: &["roles.roleName"],
    },
];

/// 사용자 애그리거트 스토어
///
/// 역할 할당 시 참조 무결성을 확인하기 위해 [`RoleStore`]를 함께 보유합니다.
/// 복제 비용이 낮으며(`Arc` 공유) 여러 태스크에서 동시에 사용할 수 있습니다.
#[derive(Clone)]
pub struct UserStore {
    repo: DocumentRepository<User>,
    roles: RoleStore,
}

impl UserStore {
    pub fn new(collection: Arc<dyn DocumentCollection>, roles: RoleStore) -> Self {
        Self {
            repo: DocumentRepository::new(collection),
            roles,
        }
    }

    // --- 영속 연산 ---

    /// 새 사용자 저장
    ///
    /// ID가 비어 있으면 새로 할당합니다. 같은 ID가 있으면 `Conflict`.
    ///
    /// 저장에 실패하면 새로 할당한 ID는 되돌립니다.
    pub async fn create(&self, user: &mut User, cancel: &CancellationToken) -> StoreResult<()> {
        let assigned = user.id.is_none();
        if assigned {
            user.set_id(new_document_id());
        }

        let result = self.repo.create(user, cancel).await;
        if assigned && result.is_err() {
            user.id = None;
        }
        result
    }

    pub async fn find_by_id(&self, id: &str, cancel: &CancellationToken) -> StoreResult<User> {
        self.repo.fetch(id, cancel).await
    }

    /// 메모리에서 변경한 사용자를 저장합니다.
    ///
    /// 조회(또는 생성) 시점의 버전 토큰이 저장된 값과 다르면 `ConcurrencyConflict`를
    /// 반환하며, 호출자가 다시 조회한 뒤 재시도해야 합니다.
    pub async fn update(&self, user: &mut User, cancel: &CancellationToken) -> StoreResult<()> {
        self.repo.replace(user, cancel).await
    }

    pub async fn delete(&self, user: &User, cancel: &CancellationToken) -> StoreResult<()> {
        self.repo.delete(user, cancel).await
    }

    /// 정규화된 사용자명으로 조회 (저장 순서상 첫 번째)
    pub async fn find_by_normalized_user_name(
        &self,
        normalized_user_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<User> {
        self.find_one(
            Predicate::by_normalized_user_name(normalized_user_name),
            cancel,
        )
        .await
    }

    /// 정규화된 이메일로 조회 (저장 순서상 첫 번째)
    pub async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<User> {
        self.find_one(Predicate::by_normalized_email(normalized_email), cancel)
            .await
    }

    /// 외부 로그인으로 조회
    ///
    /// 프로바이더와 키가 같은 로그인 항목 안에서 모두 일치해야 합니다.
    pub async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<User> {
        self.find_one(Predicate::by_login(login_provider, provider_key), cancel)
            .await
    }

    /// 클레임을 가진 모든 사용자 (저장 순서, 중복 제거 없음)
    pub async fn get_users_for_claim(
        &self,
        claim: &Claim,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<User>> {
        self.repo.find_all(&Predicate::by_claim(claim), cancel).await
    }

    /// 역할 스냅샷 이름이 정확히 일치하는 모든 사용자 (저장 순서)
    pub async fn get_users_in_role(
        &self,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<User>> {
        self.repo
            .find_all(&Predicate::by_role_name(role_name), cancel)
            .await
    }

    /// 모든 사용자 (저장 순서)
    pub async fn list_all(&self, cancel: &CancellationToken) -> StoreResult<Vec<User>> {
        self.repo.find_all(&Predicate::All, cancel).await
    }

    /// 사용자에게 역할을 할당합니다 (메모리 상의 애그리거트만 변경).
    ///
    /// 정규화된 이름으로 역할을 조회하여 `(role.id, role.name)` 스냅샷을 추가합니다.
    /// 저장하려면 이어서 [`update`](Self::update)를 호출해야 합니다.
    /// 이미 같은 스냅샷이 있어도 그대로 하나 더 추가됩니다.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - 해당 이름의 역할이 없거나, 역할 문서에 ID/이름이 없음
    /// * 그 외 역할 조회 중 발생한 에러는 그대로 전달
    pub async fn add_to_role(
        &self,
        user: &mut User,
        role_name: &str,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        let role = match self.roles.find_by_normalized_name(role_name, cancel).await {
            Ok(role) => role,
            Err(StoreError::NotFound(_)) => {
                return Err(StoreError::InvalidArgument(format!(
                    "역할 {}가 존재하지 않습니다",
                    role_name
                )));
            }
            Err(e) => return Err(e),
        };

        let (Some(role_id), Some(snapshot_name)) = (role.id, role.name) else {
            return Err(StoreError::InvalidArgument(format!(
                "역할 {}에 ID 또는 이름이 없어 할당할 수 없습니다",
                role_name
            )));
        };
        info!(
            "사용자 {:?}에 역할 할당: {} ({})",
            user.id, snapshot_name, role_id
        );

        user.push_role(role_id, snapshot_name);
        Ok(())
    }

    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        self.repo.ensure_indexes(USER_INDEXES).await
    }

    async fn find_one(&self, predicate: Predicate, cancel: &CancellationToken) -> StoreResult<User> {
        debug!("사용자 조회: {:?}", predicate);

        self.repo
            .find_first(&predicate, cancel)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("조건 {:?}에 맞는 사용자가 없습니다", predicate)))
    }

    // --- 역할 (메모리) ---

    /// 역할 스냅샷 중 이름이 정확히 일치하는 항목이 있는지 확인
    pub fn is_in_role(&self, user: &User, role_name: &str) -> bool {
        user.is_in_role(role_name)
    }

    /// 해당 이름의 역할 스냅샷을 모두 제거
    pub fn remove_from_role(&self, user: &mut User, role_name: &str) {
        user.remove_role(role_name);
    }

    /// 역할 스냅샷 이름 목록 (할당 순서)
    pub fn get_roles(&self, user: &User) -> Vec<String> {
        user.role_names()
    }

    // --- 클레임 (메모리) ---

    pub fn get_claims(&self, user: &User) -> Vec<Claim> {
        user.claims.clone()
    }

    pub fn add_claims<I>(&self, user: &mut User, claims: I)
    where
        I: IntoIterator<Item = Claim>,
    {
        user.add_claims(claims);
    }

    pub fn replace_claim(&self, user: &mut User, claim: &Claim, new_claim: &Claim) {
        user.replace_claim(claim, new_claim);
    }

    pub fn remove_claims(&self, user: &mut User, claims: &[Claim]) {
        user.remove_claims(claims);
    }

    // --- 외부 로그인 (메모리) ---

    pub fn add_login(&self, user: &mut User, login: UserLoginInfo) {
        user.add_login(login);
    }

    pub fn remove_login(&self, user: &mut User, login_provider: &str, provider_key: &str) {
        user.remove_login(login_provider, provider_key);
    }

    pub fn get_logins(&self, user: &User) -> Vec<UserLoginInfo> {
        user.logins.clone()
    }

    // --- 인증 토큰 (메모리) ---

    pub fn set_token(&self, user: &mut User, login_provider: &str, name: &str, value: &str) {
        user.set_token(login_provider, name, value);
    }

    pub fn remove_token(&self, user: &mut User, login_provider: &str, name: &str) {
        user.remove_token(login_provider, name);
    }

    pub fn get_token(&self, user: &User, login_provider: &str, name: &str) -> Option<String> {
        user.token(login_provider, name).map(str::to_string)
    }

    // --- 사용자명 / 이메일 (메모리) ---

    pub fn set_user_name(&self, user: &mut User, user_name: Option<String>) {
        user.user_name = user_name;
    }

    pub fn set_normalized_user_name(&self, user: &mut User, normalized_user_name: Option<String>) {
        user.normalized_user_name = normalized_user_name;
    }

    pub fn set_email(&self, user: &mut User, email: Option<String>) {
        user.email = email;
    }

    pub fn set_normalized_email(&self, user: &mut User, normalized_email: Option<String>) {
        user.normalized_email = normalized_email;
    }

    pub fn set_email_confirmed(&self, user: &mut User, confirmed: bool) {
        user.email_confirmed = confirmed;
    }

    // --- 비밀번호 / 보안 스탬프 (메모리) ---

    pub fn set_password_hash(&self, user: &mut User, password_hash: Option<String>) {
        user.password_hash = password_hash;
    }

    pub fn has_password(&self, user: &User) -> bool {
        user.password_hash.is_some()
    }

    pub fn set_security_stamp(&self, user: &mut User, stamp: Option<String>) {
        user.security_stamp = stamp;
    }

    // --- 전화번호 / 2단계 인증 (메모리) ---

    pub fn set_phone_number(&self, user: &mut User, phone_number: Option<String>) {
        user.phone_number = phone_number;
    }

    pub fn set_phone_number_confirmed(&self, user: &mut User, confirmed: bool) {
        user.phone_number_confirmed = confirmed;
    }

    pub fn set_two_factor_enabled(&self, user: &mut User, enabled: bool) {
        user.two_factor_enabled = enabled;
    }

    // --- 잠금 (메모리) ---

    pub fn set_lockout_enabled(&self, user: &mut User, enabled: bool) {
        user.lockout_enabled = enabled;
    }

    /// 잠금 해제 시각 설정 (밀리초 단위로 저장)
    pub fn set_lockout_end_date(&self, user: &mut User, lockout_end: Option<DateTime<Utc>>) {
        user.set_lockout_end(lockout_end);
    }

    pub fn get_lockout_end_date(&self, user: &User) -> Option<DateTime<Utc>> {
        user.lockout_end()
    }

    /// 로그인 실패 횟수를 정확히 1 증가시키고 새 값을 반환
    pub fn increment_access_failed_count(&self, user: &mut User) -> i32 {
        user.increment_access_failed_count()
    }

    /// 로그인 실패 횟수를 0으로 초기화
    pub fn reset_access_failed_count(&self, user: &mut User) {
        user.reset_access_failed_count();
    }

    pub fn get_access_failed_count(&self, user: &User) -> i32 {
        user.access_failed_count
    }
}
