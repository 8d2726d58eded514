//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! - [`documents`] - 버전 토큰 기반 낙관적 동시성을 지원하는 문서 리포지토리와 엔진 구현
//! - [`query`] - 스토어가 사용하는 조회 조건과 MongoDB 필터 변환
//!
//! # Examples
//!
//! ```rust,ignore
//! use identity_document_store::repositories::{documents::DocumentRepository, query::Predicate};
//!
//! let admins = user_repo.find_all(&Predicate::by_role_name("ADMIN"), &cancel).await?;
//! ```

pub mod documents;
pub mod query;
