//! # 문서 엔진 추상화
//!
//! 문서 리포지토리가 의존하는 엔진 경계입니다. 애그리거트 형태를 모르는
//! BSON 문서 수준의 연산만 정의하며, 버전 토큰 생성은 리포지토리가 담당하고
//! 엔진은 토큰 비교(compare-and-swap)만 수행합니다.
//!
//! 구현체:
//!
//! - [`MongoCollection`](super::mongo::MongoCollection) - 운영 환경용 MongoDB 컬렉션
//! - [`MemoryCollection`](super::memory::MemoryCollection) - 프로세스 내 엔진 (테스트/임베딩용)

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use mongodb::bson::Document as BsonDocument;

use crate::errors::StoreResult;
use crate::repositories::query::Predicate;

/// 문서 키 필드
pub const ID_FIELD: &str = "_id";
/// 버전 토큰 필드
pub const VERSION_TOKEN_FIELD: &str = "versionToken";

/// 질의 결과 스트림
///
/// 컬렉션의 저장 순서대로 문서를 하나씩 내보내는 유한한 지연 시퀀스입니다.
pub type DocumentStream = BoxStream<'static, StoreResult<BsonDocument>>;

/// 보조 인덱스 정의 (필드 경로 목록, 모두 오름차순, 유니크 아님)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub keys: &'static [&'static str],
}

/// 하나의 문서 컬렉션에 대한 엔진 연산
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// 컬렉션 이름
    fn name(&self) -> &str;

    /// 새 문서를 삽입합니다.
    ///
    /// 같은 `_id`가 이미 있으면 `Conflict`를 반환합니다.
    async fn insert(&self, document: BsonDocument) -> StoreResult<()>;

    /// `_id`로 문서를 조회합니다.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<BsonDocument>>;

    /// 저장된 버전 토큰이 `expected_token`과 같을 때만 문서를 교체합니다.
    ///
    /// 문서가 없으면 `NotFound`, 토큰이 다르면 `ConcurrencyConflict`를 반환합니다.
    async fn replace(
        &self,
        id: &str,
        expected_token: &str,
        document: BsonDocument,
    ) -> StoreResult<()>;

    /// 문서를 삭제합니다.
    ///
    /// `expected_token`이 주어지면 토큰이 같을 때만 삭제합니다.
    async fn remove(&self, id: &str, expected_token: Option<&str>) -> StoreResult<()>;

    /// 조건에 맞는 문서를 저장 순서대로 스트리밍합니다.
    async fn find(&self, predicate: &Predicate) -> StoreResult<DocumentStream>;

    /// 보조 인덱스를 생성합니다. 인덱스 개념이 없는 엔진은 아무 것도 하지 않습니다.
    async fn ensure_indexes(&self, _indexes: &[IndexSpec]) -> StoreResult<()> {
        Ok(())
    }
}
