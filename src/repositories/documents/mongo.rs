//! # MongoDB 문서 엔진
//!
//! `mongodb::Collection<Document>` 위에 [`DocumentCollection`]을 구현합니다.
//!
//! ## 낙관적 동시성
//!
//! MongoDB에는 문서 단위 ETag가 없으므로 `versionToken` 필드를 필터에 포함해
//! compare-and-swap을 수행합니다.
//!
//! ```text
//! replace_one({ _id: id, versionToken: expected }, document)
//!   matched == 1 → 성공
//!   matched == 0 → count({ _id: id }) == 0 ? NotFound : ConcurrencyConflict
//! ```
//!
//! ID 중복은 서버의 duplicate key 에러 코드(11000)로 판별합니다.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use log::{debug, info};
use mongodb::{
    Collection, IndexModel,
    bson::{Document as BsonDocument, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};

use crate::errors::{ErrorContext, StoreError, StoreResult};
use crate::repositories::documents::collection::{
    DocumentCollection, DocumentStream, ID_FIELD, IndexSpec, VERSION_TOKEN_FIELD,
};
use crate::repositories::query::Predicate;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB 컬렉션 래퍼
#[derive(Clone)]
pub struct MongoCollection {
    collection: Collection<BsonDocument>,
}

impl MongoCollection {
    pub fn new(collection: Collection<BsonDocument>) -> Self {
        Self { collection }
    }

    /// 교체/삭제가 아무 문서에도 적용되지 않았을 때 원인을 판별합니다.
    async fn missing_or_stale(&self, id: &str) -> StoreError {
        match self.collection.count_documents(doc! { ID_FIELD: id }).await {
            Ok(0) => StoreError::NotFound(format!(
                "{} 컬렉션에 ID {}가 없습니다",
                self.collection.name(),
                id
            )),
            Ok(_) => StoreError::ConcurrencyConflict(format!(
                "{} 컬렉션의 문서 {}가 다른 요청에 의해 변경되었습니다",
                self.collection.name(),
                id
            )),
            Err(e) => StoreError::TransientFailure(e.to_string()),
        }
    }
}

fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        &*error.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

/// 인덱스 정의를 드라이버 모델로 변환 (키 순서 유지, 오름차순, 유니크 아님)
fn index_models(indexes: &[IndexSpec]) -> Vec<IndexModel> {
    indexes
        .iter()
        .map(|spec| {
            let mut keys = BsonDocument::new();
            for key in spec.keys {
                keys.insert(*key, 1);
            }

            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(spec.name.to_string()).build())
                .build()
        })
        .collect()
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.collection.name()
    }

    async fn insert(&self, document: BsonDocument) -> StoreResult<()> {
        match self.collection.insert_one(document).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict(format!(
                "{} 컬렉션에 같은 ID의 문서가 이미 존재합니다",
                self.collection.name()
            ))),
            Err(e) => Err(StoreError::TransientFailure(e.to_string())),
        }
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<BsonDocument>> {
        self.collection
            .find_one(doc! { ID_FIELD: id })
            .await
            .with_context(|| format!("{} 조회 실패", self.collection.name()))
    }

    async fn replace(
        &self,
        id: &str,
        expected_token: &str,
        document: BsonDocument,
    ) -> StoreResult<()> {
        let result = self
            .collection
            .replace_one(
                doc! { ID_FIELD: id, VERSION_TOKEN_FIELD: expected_token },
                document,
            )
            .await
            .with_context(|| format!("{} 교체 실패", self.collection.name()))?;

        if result.matched_count == 0 {
            return Err(self.missing_or_stale(id).await);
        }

        Ok(())
    }

    async fn remove(&self, id: &str, expected_token: Option<&str>) -> StoreResult<()> {
        let mut filter = doc! { ID_FIELD: id };
        if let Some(token) = expected_token {
            filter.insert(VERSION_TOKEN_FIELD, token);
        }

        let result = self
            .collection
            .delete_one(filter)
            .await
            .with_context(|| format!("{} 삭제 실패", self.collection.name()))?;

        if result.deleted_count == 0 {
            return Err(self.missing_or_stale(id).await);
        }

        Ok(())
    }

    async fn find(&self, predicate: &Predicate) -> StoreResult<DocumentStream> {
        let filter = predicate.to_filter();
        debug!("[{}] find {}", self.collection.name(), filter);

        // 정렬/제한 없이 실행하여 저장 순서를 그대로 따름
        let cursor = self
            .collection
            .find(filter)
            .await
            .with_context(|| format!("{} 질의 실패", self.collection.name()))?;

        Ok(cursor
            .map_err(|e| StoreError::TransientFailure(e.to_string()))
            .boxed())
    }

    async fn ensure_indexes(&self, indexes: &[IndexSpec]) -> StoreResult<()> {
        if indexes.is_empty() {
            return Ok(());
        }

        let models = index_models(indexes);

        self.collection
            .create_indexes(models)
            .await
            .with_context(|| format!("{} 인덱스 생성 실패", self.collection.name()))?;

        info!(
            "✅ {} 인덱스 {}개 생성 완료",
            self.collection.name(),
            indexes.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use mongodb::{Client, options::ClientOptions};
    use crate::domain::entities::new_document_id;

    #[test]
    fn test_index_models_keep_names_and_key_order() {
        let specs = [
            IndexSpec {
                name: "logins",
                keys: &["logins.loginProvider", "logins.providerKey"],
            },
            IndexSpec {
                name: "normalized_email",
                keys: &["normalizedEmail"],
            },
        ];

        let models = index_models(&specs);

        assert_eq!(models.len(), 2);
        assert_eq!(
            models[0].keys,
            doc! { "logins.loginProvider": 1, "logins.providerKey": 1 }
        );
        assert_eq!(
            models[0].options.as_ref().and_then(|o| o.name.as_deref()),
            Some("logins")
        );
        assert_eq!(models[1].keys, doc! { "normalizedEmail": 1 });
        assert_eq!(
            models[1].options.as_ref().and_then(|o| o.unique),
            None
        );
    }

    #[test]
    fn test_index_models_empty() {
        assert!(index_models(&[]).is_empty());
    }

    /// 연결할 수 없는 주소의 컬렉션 (서버 선택 200ms 후 실패)
    async fn unreachable_collection() -> MongoCollection {
        let options =
            ClientOptions::parse("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200")
                .await
                .unwrap();
        let client = Client::with_options(options).unwrap();

        MongoCollection::new(client.database("identity_unreachable").collection("users"))
    }

    #[tokio::test]
    async fn test_engine_failures_are_transient() {
        let collection = unreachable_collection().await;

        assert!(matches!(
            collection.insert(doc! { "_id": "a", "versionToken": "1" }).await,
            Err(StoreError::TransientFailure(_))
        ));
        assert!(matches!(
            collection.find_by_id("a").await,
            Err(StoreError::TransientFailure(_))
        ));
        assert!(matches!(
            collection.replace("a", "1", doc! { "_id": "a" }).await,
            Err(StoreError::TransientFailure(_))
        ));
        assert!(matches!(
            collection.remove("a", None).await,
            Err(StoreError::TransientFailure(_))
        ));
    }

    /// `MONGODB_URI`가 설정된 경우에만 임시 데이터베이스를 연결
    async fn scratch_database() -> Option<Database> {
        let uri = std::env::var("MONGODB_URI").ok()?;
        let name = format!("identity_it_{}", new_document_id().replace('-', ""));

        Some(Database::connect(&uri, name).await.unwrap())
    }

    #[tokio::test]
    #[ignore = "MONGODB_URI 필요"]
    async fn test_mongo_duplicate_id_is_conflict() {
        let Some(database) = scratch_database().await else {
            return;
        };
        let collection = database.collection("users");
        collection
            .insert(doc! { "_id": "a", "versionToken": "1" })
            .await
            .unwrap();

        let result = collection.insert(doc! { "_id": "a", "versionToken": "2" }).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        database.get_database().drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "MONGODB_URI 필요"]
    async fn test_mongo_replace_and_remove_check_token() {
        let Some(database) = scratch_database().await else {
            return;
        };
        let collection = database.collection("users");
        collection
            .insert(doc! { "_id": "a", "versionToken": "1", "n": 0 })
            .await
            .unwrap();

        let stale = collection
            .replace("a", "0", doc! { "_id": "a", "versionToken": "2", "n": 1 })
            .await;
        assert!(matches!(stale, Err(StoreError::ConcurrencyConflict(_))));

        collection
            .replace("a", "1", doc! { "_id": "a", "versionToken": "2", "n": 1 })
            .await
            .unwrap();
        let stored = collection.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(stored.get_i32("n").unwrap(), 1);

        assert!(matches!(
            collection.remove("a", Some("1")).await,
            Err(StoreError::ConcurrencyConflict(_))
        ));
        collection.remove("a", Some("2")).await.unwrap();
        assert!(collection.find_by_id("a").await.unwrap().is_none());

        database.get_database().drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "MONGODB_URI 필요"]
    async fn test_mongo_missing_document_is_not_found() {
        let Some(database) = scratch_database().await else {
            return;
        };
        let collection = database.collection("roles");

        assert!(matches!(
            collection.replace("x", "1", doc! { "_id": "x" }).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            collection.remove("x", None).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            collection.remove("x", Some("1")).await,
            Err(StoreError::NotFound(_))
        ));

        database.get_database().drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "MONGODB_URI 필요"]
    async fn test_mongo_find_and_indexes() {
        let Some(database) = scratch_database().await else {
            return;
        };
        let collection = database.collection("users");
        for (id, email) in [("a", "A@X"), ("b", "B@X"), ("c", "A@X")] {
            collection
                .insert(doc! { "_id": id, "normalizedEmail": email, "versionToken": "1" })
                .await
                .unwrap();
        }
        let specs = [IndexSpec {
            name: "normalized_email",
            keys: &["normalizedEmail"],
        }];
        collection.ensure_indexes(&specs).await.unwrap();
        collection.ensure_indexes(&specs).await.unwrap();

        let ids: Vec<String> = collection
            .find(&Predicate::by_normalized_email("A@X"))
            .await
            .unwrap()
            .map_ok(|d| d.get_str("_id").unwrap().to_string())
            .try_collect()
            .await
            .unwrap();

        assert_eq!(ids, vec!["a", "c"]);
        database.get_database().drop().await.unwrap();
    }
}
