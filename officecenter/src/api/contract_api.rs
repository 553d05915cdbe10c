//! 계약 API
//!
//! 서명 세션 생성(`POST /api/contracts/{id}/signing-sessions`)도 이 스코프에 있습니다.

use crate::auth_middleware::AuthAdmin;
use crate::server::AppState;
use crate::service::contract_service::{
    ContractFilter, ContractUpdate, DeleteMode, NewContract, TerminateRequest,
};
use crate::service::signing_service::CreateSessionRequest;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared::tool::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub mode: DeleteMode,
}

pub async fn list_contracts(
    state: web::Data<AppState>,
    query: web::Query<ContractFilter>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contracts.list(&query).await?))
}

pub async fn expiring_contracts(
    state: web::Data<AppState>,
    query: web::Query<ExpiringQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contracts.expiring(query.days).await?))
}

pub async fn get_contract(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contracts.get(path.into_inner()).await?))
}

pub async fn create_contract(
    state: web::Data<AppState>,
    body: web::Json<NewContract>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Created().json(state.contracts.create(&body).await?))
}

pub async fn update_contract(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ContractUpdate>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contracts.update(path.into_inner(), &body).await?))
}

pub async fn terminate_contract(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<TerminateRequest>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contracts.terminate(path.into_inner(), &body).await?))
}

/// `?mode=soft|hard` (기본 soft)
pub async fn delete_contract(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<DeleteQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contracts.delete(path.into_inner(), query.mode).await?))
}

pub async fn contract_document(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let html = state.signing.contract_document(path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

pub async fn create_signing_session(
    state: web::Data<AppState>,
    admin: AuthAdmin,
    path: web::Path<i64>,
    body: Option<web::Json<CreateSessionRequest>>,
) -> AppResult<HttpResponse> {
    let request = body.map(|b| b.into_inner()).unwrap_or_default();
    let created = state
        .signing
        .create_session(path.into_inner(), &request, admin.admin_id()?)
        .await?;
    Ok(HttpResponse::Created().json(created))
}

pub fn configure_contract_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/contracts")
            .route("", web::get().to(list_contracts))
            .route("", web::post().to(create_contract))
            .route("/expiring", web::get().to(expiring_contracts))
            .route("/{id}", web::get().to(get_contract))
            .route("/{id}", web::put().to(update_contract))
            .route("/{id}", web::delete().to(delete_contract))
            .route("/{id}/terminate", web::post().to(terminate_contract))
            .route("/{id}/document", web::get().to(contract_document))
            .route(
                "/{id}/signing-sessions",
                web::post().to(create_signing_session),
            ),
    );
}
