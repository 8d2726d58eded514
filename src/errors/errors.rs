//! 스토어 전역에서 사용하는 에러 시스템
//!
//! 사용자/역할 스토어와 문서 리포지토리가 반환하는 모든 실패를 하나의
//! 열거형으로 표현합니다. 스토어는 어떤 에러도 내부에서 복구하거나 재시도하지
//! 않으며, 호출자가 재시도 여부를 결정합니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use identity_document_store::errors::{StoreError, StoreResult};
//!
//! async fn rename(store: &UserStore, id: &str, cancel: &CancellationToken) -> StoreResult<()> {
//!     loop {
//!         let mut user = store.find_by_id(id, cancel).await?;
//!         store.set_normalized_user_name(&mut user, Some("ALICE".to_string()));
//!
//!         match store.update(&mut user, cancel).await {
//!             Err(StoreError::ConcurrencyConflict(_)) => continue, // 다시 읽고 재시도
//!             other => return other,
//!         }
//!     }
//! }
//! ```

use thiserror::Error;

/// 스토어 에러 타입
///
/// | 변형 | 발생 상황 |
/// |------|-----------|
/// | `NotFound` | 조회/교체/삭제 대상 문서 없음 |
/// | `Conflict` | 생성 시 ID 중복 |
/// | `ConcurrencyConflict` | 버전 토큰 불일치 |
/// | `InvalidArgument` | 존재하지 않는 역할 할당, ID/토큰 없는 애그리거트 저장 |
/// | `Cancelled` | 취소 토큰에 의해 작업 중단 |
/// | `TransientFailure` | 문서 엔진의 네트워크/서비스 오류 |
/// | `Serialization` | 애그리거트 ⇄ BSON 변환 실패 |
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 대상 문서가 존재하지 않음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 같은 ID의 문서가 이미 존재함
    #[error("Conflict error: {0}")]
    Conflict(String),

    /// 읽은 시점의 버전 토큰이 저장된 토큰과 다름
    ///
    /// 최신 문서를 다시 읽은 뒤 변경을 재적용해야 합니다.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// 잘못된 인자 (예: 존재하지 않는 역할에 사용자 할당)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 호출자가 작업을 취소함
    #[error("Operation cancelled")]
    Cancelled,

    /// 문서 엔진 통신 오류
    #[error("Transient failure: {0}")]
    TransientFailure(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// 같은 요청을 (필요하면 다시 읽은 뒤) 재시도할 만한 에러인지 확인
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::ConcurrencyConflict(_) | StoreError::TransientFailure(_)
        )
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type StoreResult<T> = Result<T, StoreError>;

/// 외부 라이브러리 에러를 StoreError로 변환하는 확장 trait
///
/// 엔진 드라이버 에러는 모두 `TransientFailure`로 분류됩니다.
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> StoreResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> StoreResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> StoreResult<T> {
        self.map_err(|e| StoreError::TransientFailure(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> StoreResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| StoreError::TransientFailure(format!("{}: {}", f(), e)))
    }
}
