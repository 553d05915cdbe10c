//! 서버 시작 함수 모듈

use crate::api::configure_routes;
use crate::auth_middleware::AuthMiddleware;
use crate::server::AppState;
use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpRequest, HttpServer};
use anyhow::{Context, Result};
use shared::config::{AppConfig, DbConfig, ServerConfig};
use shared::tool::error::AppError;
use tracing::{info, warn};

/// JSON 본문 설정 - 크기 제한과 파싱 에러를 400 `AppError`로 변환
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req: &HttpRequest| {
            let message = match &err {
                error::JsonPayloadError::OverflowKnownLength { .. }
                | error::JsonPayloadError::Overflow { .. } => {
                    "요청 본문이 너무 큽니다".to_string()
                }
                other => format!("잘못된 JSON 요청: {}", other),
            };
            AppError::InvalidFormat(message).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::InvalidInput(format!("잘못된 조회 조건: {}", err)).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::InvalidInput(format!("잘못된 경로 값: {}", err)).into()
    })
}

/// CORS - 허용 origin이 설정되지 않으면 모두 허용합니다.
pub fn build_cors(server: &ServerConfig) -> Cors {
    let cors = match &server.cors_allowed_origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

/// REST API 서버 시작
pub async fn start_api_server(config: AppConfig) -> Result<()> {
    let addr = config
        .server
        .bind_address()
        .context("서버 주소 설정 오류")?;

    let db = DbConfig::connect(&config.db)
        .await
        .context("데이터베이스 연결 실패")?;

    tokio::fs::create_dir_all(&config.server.upload_dir)
        .await
        .with_context(|| format!("업로드 디렉토리 생성 실패: {:?}", config.server.upload_dir))?;

    let state = web::Data::new(
        AppState::new(db.pool.clone(), &config.server, config.security.clone())
            .context("애플리케이션 상태 초기화 실패")?,
    );
    spawn_blacklist_cleanup(state.clone());

    let server_config = config.server.clone();
    let json_limit = server_config.json_limit;
    let workers = server_config.workers;

    info!("오피스센터 API 서버 시작: http://{}", addr);
    if server_config.cors_allowed_origin.is_none() {
        warn!("CORS_ALLOWED_ORIGIN 미설정 - 모든 origin 허용");
    }

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config(json_limit))
            .app_data(query_config())
            .app_data(path_config())
            .wrap(AuthMiddleware::new(state.jwt.clone()))
            .wrap(middleware::Logger::default())
            .wrap(build_cors(&server_config))
            .configure(configure_routes)
    });
    if workers > 0 {
        server = server.workers(workers);
    }

    server
        .bind(addr)
        .with_context(|| format!("Failed to bind API server to {}", addr))?
        .run()
        .await
        .context("API server failed")?;

    db.close().await;
    info!("오피스센터 API 서버 종료");
    Ok(())
}

/// 로그아웃 토큰 블랙리스트 주기 정리
fn spawn_blacklist_cleanup(state: web::Data<AppState>) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            state.jwt.cleanup_blacklist().await;
        }
    });
}
