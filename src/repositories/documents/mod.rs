//! 문서 리포지토리 모듈
//!
//! [`DocumentRepository`]는 애그리거트 형태와 무관한 CRUD와 조건 질의를,
//! [`DocumentCollection`]은 그 아래의 엔진 경계를 제공합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use identity_document_store::repositories::documents::{DocumentRepository, MemoryCollection};
//!
//! let repo: DocumentRepository<User> = DocumentRepository::new(Arc::new(MemoryCollection::new("users")));
//! repo.create(&mut user, &cancel).await?;
//! ```

pub mod collection;
pub mod document_repository;
pub mod memory;
pub mod mongo;

pub use collection::*;
pub use document_repository::*;
pub use memory::MemoryCollection;
pub use mongo::MongoCollection;
