//! Roles Entity Module
//!
//! 역할 애그리거트를 정의합니다. 사용자 문서는 역할을 참조하지 않고
//! 할당 시점의 스냅샷(`RoleSnapshot`)을 복사해 보관합니다.

pub mod role;

pub use role::*;
