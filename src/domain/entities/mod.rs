//! # Domain Entities Module
//!
//! 문서 컬렉션에 1:1로 저장되는 애그리거트들을 정의합니다.
//!
//! - [`users::User`] - 클레임, 외부 로그인, 토큰, 역할 스냅샷을 내장한 사용자 문서
//! - [`roles::Role`] - 독립된 역할 문서
//!
//! 모든 애그리거트는 [`Document`] trait을 구현하여 문서 리포지토리가
//! ID와 버전 토큰을 애그리거트 형태와 무관하게 다룰 수 있도록 합니다.
//!
//! ## 문서 형태
//!
//! 필드 이름은 camelCase로 저장되며 문서 키는 `_id`입니다.
//!
//! ```json
//! {
//!   "_id": "0b9f3c1e-...",
//!   "normalizedUserName": "ALICE",
//!   "logins": [{ "loginProvider": "github", "providerKey": "42", "displayName": null }],
//!   "roles": [{ "roleId": "5d1c...", "roleName": "ADMIN" }],
//!   "versionToken": "e8a1..."
//! }
//! ```

use serde::{Serialize, de::DeserializeOwned};

pub mod claim;
pub mod roles;
pub mod users;

pub use claim::Claim;

/// 문서 리포지토리가 저장할 수 있는 애그리거트
///
/// ID는 생성 이후 변경되지 않으며, 버전 토큰은 저장소가 쓰기마다 교체합니다.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// 로그 및 에러 메시지에 쓰이는 애그리거트 종류 이름
    const KIND: &'static str;

    /// 문서 ID (아직 할당되지 않았으면 `None`)
    fn id(&self) -> Option<&str>;

    /// 문서 ID 설정
    fn set_id(&mut self, id: String);

    /// 마지막으로 읽거나 쓴 시점의 버전 토큰
    fn version_token(&self) -> Option<&str>;

    /// 버전 토큰 설정 (저장소 전용)
    fn set_version_token(&mut self, token: String);
}

/// 새 문서 ID를 생성합니다.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
