//! 수입/지출 거래 API

use crate::server::AppState;
use crate::service::transaction_service::{TransactionFilter, TransactionInput};
use actix_web::{web, HttpResponse};
use shared::tool::error::AppResult;

pub async fn list_transactions(
    state: web::Data<AppState>,
    query: web::Query<TransactionFilter>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.transactions.list(&query).await?))
}

pub async fn get_transaction(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.transactions.get(path.into_inner()).await?))
}

pub async fn create_transaction(
    state: web::Data<AppState>,
    body: web::Json<TransactionInput>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Created().json(state.transactions.create(&body).await?))
}

pub async fn update_transaction(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<TransactionInput>,
) -> AppResult<HttpResponse> {
    let updated = state.transactions.update(path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_transaction(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.transactions.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_transaction_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/transactions")
            .route("", web::get().to(list_transactions))
            .route("", web::post().to(create_transaction))
            .route("/{id}", web::get().to(get_transaction))
            .route("/{id}", web::put().to(update_transaction))
            .route("/{id}", web::delete().to(delete_transaction)),
    );
}
