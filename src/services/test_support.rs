//! 스토어 테스트용 애그리거트 빌더

use crate::domain::entities::{Claim, new_document_id, roles::Role, users::{User, UserLoginInfo}};
use crate::services::{IdentityStores, roles::RoleStore, users::UserStore};

pub(crate) fn in_memory_stores() -> (UserStore, RoleStore) {
    let stores = IdentityStores::in_memory();
    (stores.users, stores.roles)
}

/// 무작위 값으로 채우는 사용자 빌더
pub(crate) struct UserBuilder {
    user: User,
}

impl UserBuilder {
    pub fn create() -> Self {
        Self {
            user: User::new(format!("user-{}", new_document_id())),
        }
    }

    pub fn with_id(mut self) -> Self {
        self.user.id = Some(new_document_id());
        self
    }

    pub fn with_normalized_user_name(mut self) -> Self {
        self.user.normalized_user_name = Some(new_document_id().to_uppercase());
        self
    }

    pub fn with_normalized_email(mut self) -> Self {
        self.user.normalized_email = Some(format!("{}@EXAMPLE.COM", new_document_id().to_uppercase()));
        self
    }

    pub fn with_access_failed_count(mut self, count: i32) -> Self {
        self.user.access_failed_count = count;
        self
    }

    pub fn add_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.user.claims.push(Claim::new(claim_type, value));
        self
    }

    pub fn add_random_claim(self) -> Self {
        self.add_claim(new_document_id(), new_document_id())
    }

    pub fn add_random_claims(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.add_random_claim();
        }
        self
    }

    /// 프로바이더와 키가 모두 서로 다른 로그인 `count`개 추가
    pub fn with_logins(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.user.logins.push(UserLoginInfo::new(
                format!("provider-{}", new_document_id()),
                new_document_id(),
                None,
            ));
        }
        self
    }

    pub fn add_role(mut self, role: &Role) -> Self {
        self.user.push_role(
            role.id.clone().unwrap_or_default(),
            role.name.clone().unwrap_or_default(),
        );
        self
    }

    pub fn add_random_role(self) -> Self {
        let role = RoleBuilder::create().with_id().build();
        self.add_role(&role)
    }

    pub fn build(self) -> User {
        self.user
    }
}

/// 무작위 이름의 역할 빌더
pub(crate) struct RoleBuilder {
    role: Role,
}

impl RoleBuilder {
    pub fn create() -> Self {
        Self {
            role: Role {
                name: Some(format!("role-{}", new_document_id())),
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self) -> Self {
        self.role.id = Some(new_document_id());
        self
    }

    pub fn with_normalized_name(mut self) -> Self {
        self.role.normalized_name = self.role.name.as_ref().map(|n| n.to_uppercase());
        self
    }

    pub fn build(self) -> Role {
        self.role
    }
}
