//! 문서 데이터베이스 기반 identity 스토어
//!
//! identity 프레임워크(회원가입, 로그인, 역할 관리 등)가 사용하는 사용자/역할
//! 애그리거트를 문서 단위로 저장하고 조회합니다.
//!
//! # Features
//!
//! - **사용자 애그리거트**: 클레임, 외부 로그인, 인증 토큰, 역할 스냅샷을 한 문서에 내장
//! - **역할 애그리거트**: 독립된 컬렉션의 역할 문서
//! - **낙관적 동시성**: 쓰기마다 발급되는 버전 토큰으로 동시 수정 감지
//! - **조건 질의**: 배열 원소 단위 매칭을 포함한 조회 조건을 MongoDB 필터로 변환
//! - **취소**: 모든 비동기 연산이 `CancellationToken`을 받음
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  UserStore/RoleStore │ ← 애그리거트 연산, 역할 참조 검사
//! └─────────────────────┘
//!           │
//!           ▼
//! ┌─────────────────────┐
//! │ DocumentRepository   │ ← 직렬화, 버전 토큰, 취소
//! └─────────────────────┘
//!           │
//!           ▼
//! ┌─────────────────────┐
//! │ DocumentCollection   │ ← MongoDB 또는 프로세스 메모리
//! └─────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use identity_document_store::db::Database;
//! use identity_document_store::services::IdentityStores;
//! use tokio_util::sync::CancellationToken;
//!
//! let database = Database::new().await?;
//! let stores = IdentityStores::from_database(&database);
//! stores.ensure_indexes().await?;
//!
//! let cancel = CancellationToken::new();
//! let mut user = stores.users.find_by_normalized_user_name("ALICE", &cancel).await?;
//! stores.users.increment_access_failed_count(&mut user);
//! stores.users.update(&mut user, &cancel).await?;
//! ```

pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
