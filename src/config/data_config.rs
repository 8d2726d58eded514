//! 데이터베이스 및 컬렉션 설정 관리 모듈
//!
//! 실행 환경, MongoDB 연결, 사용자/역할 컬렉션 이름을 환경 변수에서 읽어옵니다.

use std::env;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 개발 환경
    Development,
    /// 테스트 환경
    Test,
    /// 스테이징 환경
    Staging,
    /// 프로덕션 환경
    Production,
}

impl Environment {
    /// 현재 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 환경 변수를 확인하며,
    /// 설정되지 않은 경우 `Production`을 기본값으로 사용합니다.
    pub fn current() -> Self {
        Self::from_str(&env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string()))
    }

    /// 문자열에서 Environment를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `s` - 환경 이름 문자열 (대소문자 무관)
    ///
    /// # Returns
    ///
    /// 해당하는 Environment 값. 알 수 없는 값인 경우 `Production`을 반환합니다.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    /// 환경별 기본 데이터베이스 이름 접미사
    fn database_suffix(&self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "prod",
        }
    }
}

/// MongoDB 연결 설정
pub struct DatabaseConfig;

impl DatabaseConfig {
    /// MongoDB 연결 URI
    ///
    /// # Environment Variables
    ///
    /// - `MONGODB_URI` (기본값: `mongodb://localhost:27017`)
    pub fn uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    /// 사용할 데이터베이스 이름
    ///
    /// `DATABASE_NAME`이 없으면 현재 환경에 맞는 이름을 사용합니다.
    pub fn database_name() -> String {
        env::var("DATABASE_NAME")
            .unwrap_or_else(|_| Self::database_name_for_env(&Environment::current()))
    }

    /// 특정 환경에 대한 기본 데이터베이스 이름을 반환합니다.
    pub fn database_name_for_env(env: &Environment) -> String {
        format!("identity_{}", env.database_suffix())
    }

    /// 드라이버에 전달할 애플리케이션 이름 (서버 로그/모니터링용)
    pub fn app_name() -> String {
        env::var("MONGODB_APP_NAME").unwrap_or_else(|_| "identity_document_store".to_string())
    }
}

/// 컬렉션 이름 설정
///
/// 사용자와 역할은 서로 독립된 ID 네임스페이스를 가지므로
/// 별도의 컬렉션에 저장됩니다.
pub struct CollectionConfig;

impl CollectionConfig {
    /// 사용자 컬렉션 이름 (`USERS_COLLECTION`, 기본값: `users`)
    pub fn users() -> String {
        env::var("USERS_COLLECTION").unwrap_or_else(|_| "users".to_string())
    }

    /// 역할 컬렉션 이름 (`ROLES_COLLECTION`, 기본값: `roles`)
    pub fn roles() -> String {
        env::var("ROLES_COLLECTION").unwrap_or_else(|_| "roles".to_string())
    }
}
