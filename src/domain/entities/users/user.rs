//! User Entity Implementation
//!
//! 사용자 애그리거트의 핵심 구현체입니다.
//! 클레임, 외부 로그인, 인증 토큰, 역할 스냅샷을 모두 하나의 문서에 내장합니다.
//!
//! 이 파일의 메서드들은 모두 메모리 상의 애그리거트만 변경하는 순수 연산입니다.
//! 변경 내용은 `UserStore::update`를 호출해야 저장됩니다.

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Claim, Document};

/// 외부 로그인 정보
///
/// `(login_provider, provider_key)` 쌍은 사용자 내에서 유일해야 하지만
/// 저장소가 강제하지는 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginInfo {
    pub login_provider: String,
    pub provider_key: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserLoginInfo {
    pub fn new(
        login_provider: impl Into<String>,
        provider_key: impl Into<String>,
        display_name: Option<String>,
    ) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
            display_name,
        }
    }

    fn is(&self, login_provider: &str, provider_key: &str) -> bool {
        self.login_provider == login_provider && self.provider_key == provider_key
    }
}

/// 외부 로그인 프로바이더별 인증 토큰
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserToken {
    pub login_provider: String,
    pub name: String,
    pub value: String,
}

impl UserToken {
    fn is(&self, login_provider: &str, name: &str) -> bool {
        self.login_provider == login_provider && self.name == name
    }
}

/// 역할 문서의 비정규화된 스냅샷
///
/// 할당 시점에 역할 문서에서 복사한 값이며, 이후 역할이 변경되거나 삭제되어도
/// 갱신되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSnapshot {
    pub role_id: String,
    pub role_name: String,
}

/// 사용자 애그리거트
///
/// 정규화된 이름/이메일은 호출자가 정규화한 값을 그대로 저장합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub normalized_user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub normalized_email: Option<String>,
    #[serde(default)]
    pub email_confirmed: bool,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub security_stamp: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_confirmed: bool,
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default)]
    pub lockout_enabled: bool,
    /// 잠금 해제 시각 (BSON 날짜로 저장, 밀리초 정밀도)
    #[serde(default)]
    pub lockout_end: Option<BsonDateTime>,
    #[serde(default)]
    pub access_failed_count: i32,
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub logins: Vec<UserLoginInfo>,
    #[serde(default)]
    pub tokens: Vec<UserToken>,
    #[serde(default)]
    pub roles: Vec<RoleSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_token: Option<String>,
}

impl User {
    /// 사용자명만 채운 새 사용자 생성
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            ..Default::default()
        }
    }

    // --- 역할 스냅샷 ---

    /// 역할 스냅샷을 그대로 추가 (중복 검사 없음)
    pub fn push_role(&mut self, role_id: impl Into<String>, role_name: impl Into<String>) {
        self.roles.push(RoleSnapshot {
            role_id: role_id.into(),
            role_name: role_name.into(),
        });
    }

    /// 해당 이름의 역할 스냅샷을 모두 제거하고 제거한 개수를 반환
    pub fn remove_role(&mut self, role_name: &str) -> usize {
        let before = self.roles.len();
        self.roles.retain(|r| r.role_name != role_name);
        before - self.roles.len()
    }

    pub fn is_in_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|r| r.role_name == role_name)
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.role_name.clone()).collect()
    }

    // --- 클레임 ---

    pub fn add_claims<I>(&mut self, claims: I)
    where
        I: IntoIterator<Item = Claim>,
    {
        self.claims.extend(claims);
    }

    /// `claim`과 같은 모든 항목을 `new_claim`으로 제자리 교체
    pub fn replace_claim(&mut self, claim: &Claim, new_claim: &Claim) {
        for existing in self.claims.iter_mut().filter(|c| **c == *claim) {
            *existing = new_claim.clone();
        }
    }

    pub fn remove_claims(&mut self, claims: &[Claim]) {
        self.claims.retain(|c| !claims.contains(c));
    }

    // --- 외부 로그인 ---

    pub fn add_login(&mut self, login: UserLoginInfo) {
        self.logins.push(login);
    }

    pub fn remove_login(&mut self, login_provider: &str, provider_key: &str) {
        self.logins.retain(|l| !l.is(login_provider, provider_key));
    }

    pub fn has_login(&self, login_provider: &str, provider_key: &str) -> bool {
        self.logins.iter().any(|l| l.is(login_provider, provider_key))
    }

    // --- 인증 토큰 ---

    /// 같은 `(login_provider, name)` 토큰이 있으면 값을 교체하고, 없으면 추가
    pub fn set_token(&mut self, login_provider: &str, name: &str, value: impl Into<String>) {
        let value = value.into();

        match self.tokens.iter_mut().find(|t| t.is(login_provider, name)) {
            Some(token) => token.value = value,
            None => self.tokens.push(UserToken {
                login_provider: login_provider.to_string(),
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_token(&mut self, login_provider: &str, name: &str) {
        self.tokens.retain(|t| !t.is(login_provider, name));
    }

    pub fn token(&self, login_provider: &str, name: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|t| t.is(login_provider, name))
            .map(|t| t.value.as_str())
    }

    // --- 잠금 ---

    pub fn set_lockout_end(&mut self, lockout_end: Option<DateTime<Utc>>) {
        self.lockout_end = lockout_end.map(|end| BsonDateTime::from_millis(end.timestamp_millis()));
    }

    pub fn lockout_end(&self) -> Option<DateTime<Utc>> {
        self.lockout_end
            .and_then(|end| DateTime::from_timestamp_millis(end.timestamp_millis()))
    }

    /// 로그인 실패 횟수를 1 증가시키고 증가된 값을 반환 (`i32::MAX`에서 멈춤)
    pub fn increment_access_failed_count(&mut self) -> i32 {
        self.access_failed_count = self.access_failed_count.saturating_add(1);
        self.access_failed_count
    }

    pub fn reset_access_failed_count(&mut self) {
        self.access_failed_count = 0;
    }
}

impl Document for User {
    const KIND: &'static str = "user";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn version_token(&self) -> Option<&str> {
        self.version_token.as_deref()
    }

    fn set_version_token(&mut self, token: String) {
        self.version_token = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::spec::ElementType;

    #[test]
    fn test_set_token_replaces_existing_value() {
        let mut user = User::new("alice");
        user.set_token("github", "access_token", "first");
        user.set_token("github", "refresh_token", "r1");
        user.set_token("github", "access_token", "second");

        assert_eq!(user.tokens.len(), 2);
        assert_eq!(user.token("github", "access_token"), Some("second"));
        assert_eq!(user.token("github", "refresh_token"), Some("r1"));
        assert_eq!(user.token("google", "access_token"), None);

        user.remove_token("github", "access_token");
        assert_eq!(user.token("github", "access_token"), None);
        assert_eq!(user.tokens.len(), 1);
    }

    #[test]
    fn test_replace_and_remove_claims() {
        let mut user = User::new("alice");
        let old = Claim::new("department", "sales");
        let new = Claim::new("department", "support");

        user.add_claims([
            old.clone(),
            Claim::new("level", "3"),
            old.clone(),
        ]);
        user.replace_claim(&old, &new);

        assert_eq!(
            user.claims,
            vec![new.clone(), Claim::new("level", "3"), new.clone()]
        );

        user.remove_claims(&[new]);
        assert_eq!(user.claims, vec![Claim::new("level", "3")]);
    }

    #[test]
    fn test_remove_login_requires_both_fields() {
        let mut user = User::new("alice");
        user.add_login(UserLoginInfo::new("github", "1", None));
        user.add_login(UserLoginInfo::new("google", "1", None));

        user.remove_login("github", "2");
        assert_eq!(user.logins.len(), 2);

        user.remove_login("github", "1");
        assert!(!user.has_login("github", "1"));
        assert!(user.has_login("google", "1"));
    }

    #[test]
    fn test_remove_role_drops_every_duplicate() {
        let mut user = User::new("alice");
        user.push_role("r1", "ADMIN");
        user.push_role("r2", "EDITOR");
        user.push_role("r1", "ADMIN");

        assert_eq!(user.remove_role("ADMIN"), 2);
        assert_eq!(user.role_names(), vec!["EDITOR".to_string()]);
    }

    #[test]
    fn test_increment_access_failed_count_saturates() {
        let mut user = User::new("alice");
        user.access_failed_count = i32::MAX;

        assert_eq!(user.increment_access_failed_count(), i32::MAX);
        assert_eq!(user.access_failed_count, i32::MAX);
    }

    #[test]
    fn test_lockout_end_is_stored_as_bson_date() {
        let mut user = User::new("alice");
        let end = DateTime::from_timestamp_millis(1_767_225_600_123).unwrap();
        user.set_lockout_end(Some(end));

        let document = mongodb::bson::to_document(&user).unwrap();

        assert_eq!(
            document.get("lockoutEnd").map(|v| v.element_type()),
            Some(ElementType::DateTime)
        );
        let decoded: User = mongodb::bson::from_document(document).unwrap();
        assert_eq!(decoded.lockout_end(), Some(end));

        user.set_lockout_end(None);
        assert_eq!(user.lockout_end(), None);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut user = User::new("alice");
        user.set_id("u-1".to_string());
        user.normalized_email = Some("ALICE@EXAMPLE.COM".to_string());
        user.add_login(UserLoginInfo::new("github", "42", Some("GitHub".to_string())));
        user.push_role("r-1", "ADMIN");

        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["_id"], "u-1");
        assert_eq!(json["normalizedEmail"], "ALICE@EXAMPLE.COM");
        assert_eq!(json["logins"][0]["loginProvider"], "github");
        assert_eq!(json["logins"][0]["providerKey"], "42");
        assert_eq!(json["roles"][0]["roleName"], "ADMIN");
        assert!(json.get("versionToken").is_none());
    }
}
