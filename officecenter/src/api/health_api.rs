//! 헬스체크

use crate::server::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;
use shared::config::DbConfig;

/// DB 연결 확인. 실패하면 503 + `degraded`.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let database = DbConfig::health_check(&state.pool).await;
    let body = json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "timestamp": chrono::Utc::now(),
    });

    if database {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
