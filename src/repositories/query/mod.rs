//! 조회 조건 변환 모듈
//!
//! 사용자/역할 스토어가 사용하는 조회 형태를 [`Predicate`]로 표현합니다.
//! 일반적인 쿼리 언어가 아니라, 스토어가 실제로 쓰는 형태만 제공합니다.
//!
//! ```rust,ignore
//! use identity_document_store::repositories::query::Predicate;
//!
//! let filter = Predicate::by_login("github", "583231").to_filter();
//! // { "logins": { "$elemMatch": { "loginProvider": "github", "providerKey": "583231" } } }
//! ```

pub mod predicate;

pub use predicate::*;
