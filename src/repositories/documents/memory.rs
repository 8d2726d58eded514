//! # 프로세스 내 문서 엔진
//!
//! 삽입 순서를 유지하는 벡터에 BSON 문서를 보관합니다. 조회 조건은
//! [`Predicate::matches`]로 평가되므로 MongoDB 필터와 같은 의미를 가집니다.
//! 테스트 스위트와, 외부 데이터베이스 없이 스토어를 띄우려는 임베딩 환경에서 사용합니다.

use async_trait::async_trait;
use futures_util::stream;
use log::debug;
use mongodb::bson::{Bson, Document as BsonDocument};
use tokio::sync::RwLock;

use crate::errors::{StoreError, StoreResult};
use crate::repositories::documents::collection::{
    DocumentCollection, DocumentStream, ID_FIELD, VERSION_TOKEN_FIELD,
};
use crate::repositories::query::Predicate;

/// 메모리 문서 컬렉션
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<BsonDocument>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }

    /// 저장된 문서 수
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn id_of(document: &BsonDocument) -> Option<&str> {
    match document.get(ID_FIELD) {
        Some(Bson::String(id)) => Some(id.as_str()),
        _ => None,
    }
}

fn token_of(document: &BsonDocument) -> Option<&str> {
    match document.get(VERSION_TOKEN_FIELD) {
        Some(Bson::String(token)) => Some(token.as_str()),
        _ => None,
    }
}

fn position_of(documents: &[BsonDocument], id: &str) -> Option<usize> {
    documents.iter().position(|d| id_of(d) == Some(id))
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, document: BsonDocument) -> StoreResult<()> {
        let id = id_of(&document)
            .ok_or_else(|| StoreError::InvalidArgument("문서에 _id가 없습니다".to_string()))?
            .to_string();

        let mut documents = self.documents.write().await;
        if position_of(&documents, &id).is_some() {
            return Err(StoreError::Conflict(format!(
                "{} 컬렉션에 ID {}가 이미 존재합니다",
                self.name, id
            )));
        }

        documents.push(document);
        debug!("[{}] 문서 삽입: {}", self.name, id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<BsonDocument>> {
        let documents = self.documents.read().await;
        Ok(position_of(&documents, id).map(|i| documents[i].clone()))
    }

    async fn replace(
        &self,
        id: &str,
        expected_token: &str,
        document: BsonDocument,
    ) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let index = position_of(&documents, id).ok_or_else(|| {
            StoreError::NotFound(format!("{} 컬렉션에 ID {}가 없습니다", self.name, id))
        })?;

        if token_of(&documents[index]) != Some(expected_token) {
            return Err(StoreError::ConcurrencyConflict(format!(
                "{} 컬렉션의 문서 {}가 다른 요청에 의해 변경되었습니다",
                self.name, id
            )));
        }

        // 제자리 교체로 저장 순서를 유지
        documents[index] = document;
        Ok(())
    }

    async fn remove(&self, id: &str, expected_token: Option<&str>) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let index = position_of(&documents, id).ok_or_else(|| {
            StoreError::NotFound(format!("{} 컬렉션에 ID {}가 없습니다", self.name, id))
        })?;

        if let Some(expected) = expected_token {
            if token_of(&documents[index]) != Some(expected) {
                return Err(StoreError::ConcurrencyConflict(format!(
                    "{} 컬렉션의 문서 {}가 다른 요청에 의해 변경되었습니다",
                    self.name, id
                )));
            }
        }

        documents.remove(index);
        Ok(())
    }

    async fn find(&self, predicate: &Predicate) -> StoreResult<DocumentStream> {
        let matched: Vec<StoreResult<BsonDocument>> = self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| predicate.matches(d))
            .cloned()
            .map(Ok)
            .collect();

        Ok(Box::pin(stream::iter(matched)))
    }
}
