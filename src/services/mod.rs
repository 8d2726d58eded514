//! 사용자/역할 애그리거트 스토어 계층
//!
//! identity 프레임워크가 직접 호출하는 표면입니다. 각 스토어는 문서 리포지토리
//! 위에서 애그리거트 단위 연산을 제공하며, 메모리 상의 변경과 저장을 분리합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use identity_document_store::services::IdentityStores;
//! use tokio_util::sync::CancellationToken;
//!
//! let stores = IdentityStores::from_database(&database);
//! let cancel = CancellationToken::new();
//!
//! let mut user = stores.users.find_by_normalized_email("ALICE@EXAMPLE.COM", &cancel).await?;
//! stores.users.add_to_role(&mut user, "ADMIN", &cancel).await?;
//! stores.users.update(&mut user, &cancel).await?;
//! ```

pub mod roles;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use log::info;

use crate::config::CollectionConfig;
use crate::db::Database;
use crate::errors::StoreResult;
use crate::repositories::documents::MemoryCollection;
use roles::RoleStore;
use users::UserStore;

/// 같은 데이터베이스를 공유하는 사용자/역할 스토어 묶음
///
/// 사용자와 역할은 서로 다른 컬렉션에 저장되므로 ID 공간이 독립적입니다.
#[derive(Clone)]
pub struct IdentityStores {
    pub users: UserStore,
    pub roles: RoleStore,
}

impl IdentityStores {
    /// MongoDB 컬렉션 위에 스토어를 구성합니다.
    ///
    /// 컬렉션 이름은 `USERS_COLLECTION` / `ROLES_COLLECTION` 환경 변수를 따릅니다.
    pub fn from_database(database: &Database) -> Self {
        let roles = RoleStore::new(Arc::new(database.collection(&CollectionConfig::roles())));
        let users = UserStore::new(
            Arc::new(database.collection(&CollectionConfig::users())),
            roles.clone(),
        );

        Self { users, roles }
    }

    /// 프로세스 메모리에 보관하는 스토어를 구성합니다.
    pub fn in_memory() -> Self {
        let roles = RoleStore::new(Arc::new(MemoryCollection::new(CollectionConfig::roles())));
        let users = UserStore::new(
            Arc::new(MemoryCollection::new(CollectionConfig::users())),
            roles.clone(),
        );

        Self { users, roles }
    }

    /// 두 컬렉션의 조회용 인덱스를 생성합니다. 여러 번 호출해도 안전합니다.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        self.users.ensure_indexes().await?;
        self.roles.ensure_indexes().await?;

        info!("✅ 사용자/역할 인덱스 준비 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{roles::Role, users::User};
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_in_memory_stores_share_role_collection() {
        let stores = IdentityStores::in_memory();
        let cancel = CancellationToken::new();
        stores
            .roles
            .create(&mut Role::new("Admin", "ADMIN"), &cancel)
            .await
            .unwrap();

        let mut user = User::new("alice");
        stores.users.add_to_role(&mut user, "ADMIN", &cancel).await.unwrap();

        assert_eq!(stores.users.get_roles(&user), vec!["Admin".to_string()]);
    }

    #[tokio::test]
    async fn test_user_and_role_ids_are_independent() {
        let stores = IdentityStores::in_memory();
        let cancel = CancellationToken::new();
        let mut role = Role::new("Admin", "ADMIN");
        role.id = Some("shared".to_string());
        let mut user = User::new("alice");
        user.id = Some("shared".to_string());

        stores.roles.create(&mut role, &cancel).await.unwrap();
        stores.users.create(&mut user, &cancel).await.unwrap();

        assert_eq!(
            stores.users.find_by_id("shared", &cancel).await.unwrap().user_name.as_deref(),
            Some("alice")
        );
        assert_eq!(
            stores.roles.find_by_id("shared", &cancel).await.unwrap().name.as_deref(),
            Some("Admin")
        );
    }

    #[tokio::test]
    async fn test_ensure_indexes_on_memory_is_noop() {
        let stores = IdentityStores::in_memory();

        stores.ensure_indexes().await.unwrap();
        stores.ensure_indexes().await.unwrap();
    }
}
