//! # Domain Layer Module
//!
//! 저장소에 영속되는 identity 애그리거트를 정의하는 도메인 계층입니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! └── Entities  - User / Role 애그리거트와 내장 값 객체
//!      │
//!      ▼
//! Services (UserStore, RoleStore)
//!      │
//!      ▼
//! Repositories (DocumentRepository, Predicate)
//! ```
//!
//! 애그리거트는 저장 단위이자 동시성 제어 단위입니다. 내장된 클레임, 로그인,
//! 토큰, 역할 스냅샷은 별도 문서가 아니라 사용자 문서의 일부로 함께 저장됩니다.

pub mod entities;
