//! # 문서 리포지토리 구현
//!
//! 애그리거트 형태와 무관한 생성/조회/교체/삭제와 조건 질의를 제공하는 어댑터입니다.
//! 엔진([`DocumentCollection`]) 위에서 다음을 담당합니다.
//!
//! - 애그리거트 ⇄ BSON 문서 변환
//! - 쓰기마다 새 버전 토큰 발급 및 애그리거트에 반영
//! - 호출 단위 취소 (`CancellationToken`)
//!
//! 재시도는 하지 않습니다. 모든 에러는 그대로 호출자에게 전달됩니다.
//!
//! ## 취소
//!
//! 모든 연산은 엔진 호출을 취소 토큰과 경쟁시킵니다. 토큰이 먼저 완료되면
//! 진행 중인 엔진 future를 버리고 `Cancelled`를 반환하며, 애그리거트의 ID와
//! 버전 토큰은 변경하지 않습니다.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use log::{debug, info, warn};
use mongodb::bson::{self, Bson};
use tokio_util::sync::CancellationToken;

use crate::domain::entities::Document;
use crate::errors::{StoreError, StoreResult};
use crate::repositories::documents::collection::{
    DocumentCollection, DocumentStream, IndexSpec, VERSION_TOKEN_FIELD,
};
use crate::repositories::query::Predicate;

/// 애그리거트 질의 결과 스트림
pub type AggregateStream<T> = BoxStream<'static, StoreResult<T>>;

/// 작업을 취소 토큰과 경쟁시킵니다.
///
/// 이미 취소된 토큰이면 작업을 시작하지 않고 즉시 `Cancelled`를 반환합니다.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, operation: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(StoreError::Cancelled),
        result = operation => result,
    }
}

fn new_version_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 한 문서 컬렉션에 대한 타입 지정 리포지토리
pub struct DocumentRepository<T: Document> {
    collection: Arc<dyn DocumentCollection>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Clone for DocumentRepository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            _marker: PhantomData,
        }
    }
}

impl<T: Document + 'static> DocumentRepository<T> {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            collection,
            _marker: PhantomData,
        }
    }

    fn require_id(document: &T) -> StoreResult<String> {
        document.id().map(str::to_string).ok_or_else(|| {
            StoreError::InvalidArgument(format!("{} 문서에 ID가 없습니다", T::KIND))
        })
    }

    /// 애그리거트를 새 토큰이 포함된 BSON 문서로 변환
    fn encode(document: &T, token: &str) -> StoreResult<bson::Document> {
        let mut encoded = bson::to_document(document)?;
        encoded.insert(VERSION_TOKEN_FIELD, Bson::String(token.to_string()));
        Ok(encoded)
    }

    fn decode(document: bson::Document) -> StoreResult<T> {
        Ok(bson::from_document(document)?)
    }

    /// 새 문서를 삽입합니다.
    ///
    /// 성공하면 발급된 버전 토큰이 `document`에 기록됩니다.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - ID가 없음
    /// * `Conflict` - 같은 ID의 문서가 이미 존재
    pub async fn create(&self, document: &mut T, cancel: &CancellationToken) -> StoreResult<()> {
        let id = Self::require_id(document)?;
        let token = new_version_token();
        let encoded = Self::encode(document, &token)?;

        run_cancellable(cancel, self.collection.insert(encoded)).await?;

        document.set_version_token(token);
        info!("[{}] {} 생성: {}", self.collection.name(), T::KIND, id);
        Ok(())
    }

    /// ID로 문서를 조회합니다. 없으면 `NotFound`.
    pub async fn fetch(&self, id: &str, cancel: &CancellationToken) -> StoreResult<T> {
        let found = run_cancellable(cancel, self.collection.find_by_id(id)).await?;

        match found {
            Some(document) => Self::decode(document),
            None => Err(StoreError::NotFound(format!(
                "{} {}를 찾을 수 없습니다",
                T::KIND,
                id
            ))),
        }
    }

    /// 읽은 시점의 버전 토큰을 기대값으로 문서를 교체합니다.
    ///
    /// 성공하면 새 버전 토큰이 `document`에 기록됩니다.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - ID 또는 버전 토큰이 없음 (조회/생성되지 않은 애그리거트)
    /// * `NotFound` - 저장된 문서가 없음
    /// * `ConcurrencyConflict` - 그 사이 다른 쓰기가 있었음
    pub async fn replace(&self, document: &mut T, cancel: &CancellationToken) -> StoreResult<()> {
        let id = Self::require_id(document)?;
        let expected = document.version_token().map(str::to_string).ok_or_else(|| {
            StoreError::InvalidArgument(format!(
                "{} {}에 버전 토큰이 없습니다. 먼저 조회하거나 생성해야 합니다",
                T::KIND,
                id
            ))
        })?;

        let token = new_version_token();
        let encoded = Self::encode(document, &token)?;

        let result =
            run_cancellable(cancel, self.collection.replace(&id, &expected, encoded)).await;
        if let Err(StoreError::ConcurrencyConflict(_)) = &result {
            warn!(
                "[{}] {} {} 버전 충돌 (expected: {})",
                self.collection.name(),
                T::KIND,
                id,
                expected
            );
        }
        result?;

        document.set_version_token(token);
        debug!("[{}] {} 교체: {}", self.collection.name(), T::KIND, id);
        Ok(())
    }

    /// 문서를 삭제합니다.
    ///
    /// 애그리거트에 버전 토큰이 있으면 토큰이 같을 때만 삭제합니다.
    /// 연관 문서에 대한 연쇄 삭제는 없습니다.
    pub async fn delete(&self, document: &T, cancel: &CancellationToken) -> StoreResult<()> {
        let id = Self::require_id(document)?;

        run_cancellable(
            cancel,
            self.collection.remove(&id, document.version_token()),
        )
        .await?;

        info!("[{}] {} 삭제: {}", self.collection.name(), T::KIND, id);
        Ok(())
    }

    /// 조건에 맞는 문서를 저장 순서대로 내보내는 지연 스트림을 엽니다.
    ///
    /// 스트림 자체는 취소 토큰을 관찰하지 않습니다. 취소가 필요한 소비는
    /// [`find_first`](Self::find_first) / [`find_all`](Self::find_all)을 사용합니다.
    pub async fn query(
        &self,
        predicate: &Predicate,
        cancel: &CancellationToken,
    ) -> StoreResult<AggregateStream<T>> {
        let stream: DocumentStream = run_cancellable(cancel, self.collection.find(predicate)).await?;

        Ok(stream
            .map(|item| item.and_then(Self::decode))
            .boxed())
    }

    /// 조건에 맞는 첫 문서 (저장 순서 기준)
    pub async fn find_first(
        &self,
        predicate: &Predicate,
        cancel: &CancellationToken,
    ) -> StoreResult<Option<T>> {
        let mut stream = self.query(predicate, cancel).await?;

        run_cancellable(cancel, async { stream.next().await.transpose() }).await
    }

    /// 조건에 맞는 모든 문서 (저장 순서 기준, 개수 제한 없음)
    pub async fn find_all(
        &self,
        predicate: &Predicate,
        cancel: &CancellationToken,
    ) -> StoreResult<Vec<T>> {
        let mut stream = self.query(predicate, cancel).await?;
        let mut documents = Vec::new();

        while let Some(item) = run_cancellable(cancel, async { Ok(stream.next().await) }).await? {
            documents.push(item?);
        }

        debug!(
            "[{}] {:?} → {}건",
            self.collection.name(),
            predicate,
            documents.len()
        );
        Ok(documents)
    }

    /// 보조 인덱스를 생성합니다.
    pub async fn ensure_indexes(&self, indexes: &[IndexSpec]) -> StoreResult<()> {
        self.collection.ensure_indexes(indexes).await
    }
}
