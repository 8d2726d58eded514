//! Users Entity Module
//!
//! 사용자 애그리거트와 그에 내장되는 값 객체들을 정의합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use identity_document_store::domain::entities::users::{User, UserLoginInfo};
//!
//! let mut user = User::new("alice");
//! user.normalized_user_name = Some("ALICE".to_string());
//! user.add_login(UserLoginInfo::new("github", "583231", Some("GitHub".to_string())));
//! ```

pub mod user;

pub use user::*;
