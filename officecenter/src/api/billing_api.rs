//! 월별 청구 API

use crate::server::AppState;
use crate::service::billing_service::{BillingFilter, ConfirmPayment, GenerateRequest};
use actix_web::{web, HttpResponse};
use shared::tool::error::AppResult;

pub async fn list_billings(
    state: web::Data<AppState>,
    query: web::Query<BillingFilter>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.billings.list(&query).await?))
}

pub async fn get_billing(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.billings.get(path.into_inner()).await?))
}

/// 대상 월의 청구 일괄 생성
pub async fn generate_billings(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.billings.generate(body.billing_month).await?))
}

/// 입금 확인. 본문을 생략하면 청구액 전액, 오늘 날짜로 처리합니다.
pub async fn confirm_billing(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: Option<web::Json<ConfirmPayment>>,
) -> AppResult<HttpResponse> {
    let payment = body.map(|b| b.into_inner()).unwrap_or_default();
    Ok(HttpResponse::Ok().json(state.billings.confirm(path.into_inner(), payment).await?))
}

pub async fn cancel_billing(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.billings.cancel(path.into_inner()).await?))
}

pub async fn delete_billing(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.billings.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_billing_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/billings")
            .route("", web::get().to(list_billings))
            .route("/generate", web::post().to(generate_billings))
            .route("/{id}", web::get().to(get_billing))
            .route("/{id}", web::delete().to(delete_billing))
            .route("/{id}/confirm", web::post().to(confirm_billing))
            .route("/{id}/cancel", web::post().to(cancel_billing)),
    );
}
