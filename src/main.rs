//! identity 스토어 프로비저닝 도구
//!
//! 설정된 MongoDB에 연결하여 사용자/역할 컬렉션의 조회용 인덱스를 생성합니다.
//! 배포 파이프라인에서 한 번 실행하는 용도이며, 네트워크 API는 제공하지 않습니다.

use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use identity_document_store::config::{CollectionConfig, Environment};
use identity_document_store::db::Database;
use identity_document_store::errors::StoreResult;
use identity_document_store::services::IdentityStores;

#[tokio::main]
async fn main() -> StoreResult<()> {
    // 로깅을 먼저 켜야 .env 로드 결과가 출력됨
    init_logging();
    load_env_file();

    info!("🚀 identity 스토어 프로비저닝 시작 ({:?})", Environment::current());

    info!("📡 데이터베이스 연결 중...");
    let database = Database::new().await.inspect_err(|e| {
        error!("데이터베이스 연결 실패: {}", e);
    })?;

    let stores = IdentityStores::from_database(&database);
    stores.ensure_indexes().await?;

    info!(
        "✅ 프로비저닝 완료: {} ({}, {})",
        database.database_name(),
        CollectionConfig::users(),
        CollectionConfig::roles()
    );
    Ok(())
}

/// 환경별 설정 파일을 로드합니다
///
/// # Environment Variables
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// 로깅 시스템을 초기화합니다 (`RUST_LOG`, 기본값: "info")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
}
