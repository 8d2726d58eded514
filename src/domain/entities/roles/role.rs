//! Role Entity Implementation

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Claim, Document};

/// 역할 애그리거트
///
/// `normalized_name`은 호출자가 정규화한 값이며, 저장소는 유일성을 강제하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub normalized_name: Option<String>,
    /// 역할에 부여된 클레임
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_token: Option<String>,
}

impl Role {
    /// 이름과 정규화된 이름으로 새 역할 생성 (ID는 저장 시 할당)
    pub fn new(name: impl Into<String>, normalized_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            normalized_name: Some(normalized_name.into()),
            ..Default::default()
        }
    }

    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    /// 같은 클레임을 모두 제거
    pub fn remove_claim(&mut self, claim: &Claim) {
        self.claims.retain(|c| c != claim);
    }
}

impl Document for Role {
    const KIND: &'static str = "role";

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

    #[test]
    fn test_role_claims() {
        let mut role = Role::new("Admin", "ADMIN");
        role.add_claim(Claim::new("permission", "users.write"));
        role.add_claim(Claim::new("permission", "users.read"));
        role.add_claim(Claim::new("permission", "users.write"));

        role.remove_claim(&Claim::new("permission", "users.write"));

        assert_eq!(role.claims, vec![Claim::new("permission", "users.read")]);
    }

    #[test]
    fn test_deserialize_without_claims() {
        let doc = mongodb::bson::doc! {
            "_id": "r-1",
            "name": "Admin",
            "normalizedName": "ADMIN",
            "versionToken": "v-1",
        };

        let role: Role = mongodb::bson::from_document(doc).unwrap();

        assert_eq!(role.id(), Some("r-1"));
        assert_eq!(role.normalized_name.as_deref(), Some("ADMIN"));
        assert!(role.claims.is_empty());
        assert_eq!(role.version_token(), Some("v-1"));
    }
}
