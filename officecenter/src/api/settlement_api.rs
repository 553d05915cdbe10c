//! 월별 정산 API

use crate::auth_middleware::AuthAdmin;
use crate::server::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared::tool::error::AppResult;
use shared::tool::YearMonth;

#[derive(Debug, Deserialize)]
pub struct SettlementListQuery {
    pub year: Option<i32>,
}

pub async fn list_settlements(
    state: web::Data<AppState>,
    query: web::Query<SettlementListQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.settlements.list(query.year).await?))
}

/// 확정된 월은 스냅샷, 아니면 실시간 집계
pub async fn get_settlement(
    state: web::Data<AppState>,
    path: web::Path<YearMonth>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.settlements.report(path.into_inner()).await?))
}

pub async fn confirm_settlement(
    state: web::Data<AppState>,
    admin: AuthAdmin,
    path: web::Path<YearMonth>,
) -> AppResult<HttpResponse> {
    let report = state
        .settlements
        .confirm(path.into_inner(), admin.admin_id()?)
        .await?;
    Ok(HttpResponse::Created().json(report))
}

pub fn configure_settlement_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/settlements")
            .route("", web::get().to(list_settlements))
            .route("/{month}", web::get().to(get_settlement))
            .route("/{month}/confirm", web::post().to(confirm_settlement)),
    );
}
