//! # Configuration Module
//!
//! 스토어의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 중앙집중식으로 관리합니다.
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 실행 환경 (development, test, staging, production)
//! export ENVIRONMENT="development"
//!
//! # MongoDB 연결
//! export MONGODB_URI="mongodb://localhost:27017"
//! export DATABASE_NAME="identity_dev"
//! export MONGODB_APP_NAME="identity_document_store"
//!
//! # 컬렉션 이름
//! export USERS_COLLECTION="users"
//! export ROLES_COLLECTION="roles"
//! ```
//!
//! 바이너리는 `PROFILE`에 따라 `.env.dev` / `.env.prod` / `.env` 파일을 먼저 로드합니다.

pub mod data_config;

pub use data_config::*;
