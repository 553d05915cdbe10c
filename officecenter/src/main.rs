//! 오피스센터 서버 실행 파일
//!
//! `officecenter [start|migrate|create-admin|help]`

use anyhow::{Context, Result};
use officecenter::server::start_api_server;
use officecenter::service::AdminService;
use officecenter::MIGRATOR;
use shared::config::{AppConfig, DbConfig};
use shared::logging::{init_logging, ServiceType};
use tracing::{error, info};

fn load_config(service_type: ServiceType) -> Result<AppConfig> {
    let config = AppConfig::from_env().context("설정 로드 실패")?;
    init_logging(service_type, &config.logging).context("로깅 초기화 실패")?;
    Ok(config)
}

/// 마이그레이션 실행
async fn run_migrations() -> Result<()> {
    let config = load_config(ServiceType::Cli)?;
    let db = DbConfig::connect(&config.db)
        .await
        .context("데이터베이스 연결 실패")?;

    MIGRATOR
        .run(db.get_pool())
        .await
        .context("마이그레이션 실패")?;

    info!("마이그레이션 완료: {}", config.db.database);
    db.close().await;
    Ok(())
}

/// 관리자 계정 생성
async fn create_admin(args: &[String]) -> Result<()> {
    let (username, password) = match (args.get(2), args.get(3)) {
        (Some(username), Some(password)) => (username, password),
        _ => {
            anyhow::bail!("사용법: officecenter create-admin <username> <password> [name]");
        }
    };
    let name = args.get(4).unwrap_or(username);

    let config = load_config(ServiceType::Cli)?;
    let db = DbConfig::connect(&config.db)
        .await
        .context("데이터베이스 연결 실패")?;

    let admin = AdminService::new(db.pool.clone())
        .create_admin(username, password, name, config.security.bcrypt_rounds)
        .await
        .context("관리자 생성 실패")?;

    info!(admin_id = admin.id, username = %admin.username, "관리자 계정 생성 완료");
    db.close().await;
    Ok(())
}

async fn run_server() -> Result<()> {
    let config = load_config(ServiceType::ApiServer)?;
    start_api_server(config).await
}

fn print_help() {
    println!("오피스센터 임대 관리 서버");
    println!();
    println!("사용법: cargo run -p officecenter [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("  start                                   API 서버 시작 (기본값)");
    println!("  migrate                                 데이터베이스 마이그레이션");
    println!("  create-admin <username> <password> [name]  관리자 계정 생성");
    println!("  help                                    이 도움말 표시");
    println!();
    println!("환경변수:");
    println!("  DATABASE_URL                 MariaDB 접속 URL (db_host/db_port/db_id/db_password/db_name 대신)");
    println!("  server_host=127.0.0.1        API 서버 호스트");
    println!("  server_port=8080             API 서버 포트");
    println!("  PUBLIC_BASE_URL              서명 링크 외부 주소");
    println!("  UPLOAD_DIR=./uploads         서명 이미지 저장 경로");
    println!("  CORS_ALLOWED_ORIGIN          허용 origin (없으면 모두 허용)");
    println!("  JWT_SECRET_KEY               JWT 서명 키 (32자 이상)");
    println!("  JWT_EXPIRATION_HOURS=12      토큰 유효시간");
    println!("  SIGNING_EXPIRATION_DAYS=7    서명 링크 유효기간");
    println!("  BCRYPT_ROUNDS=12             비밀번호 해시 비용");
    println!("  LOG_LEVEL=info               로그 레벨 (RUST_LOG 우선)");
    println!("  LOG_JSON_FORMAT=false        JSON 로그 출력");
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("start");

    let result = match command {
        "start" => run_server().await,
        "migrate" => run_migrations().await,
        "create-admin" => create_admin(&args).await,
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        _ => {
            println!("알 수 없는 명령어: {}", command);
            println!("사용 가능한 명령어: start, migrate, create-admin, help");
            return Ok(());
        }
    };

    if let Err(e) = &result {
        error!("실행 실패: {:#}", e);
    }
    result
}
