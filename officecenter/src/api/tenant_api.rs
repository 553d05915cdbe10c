//! 입주사 API

use crate::server::AppState;
use crate::service::tenant_service::{TenantFilter, TenantInput};
use actix_web::{web, HttpResponse};
use shared::tool::error::AppResult;

pub async fn list_tenants(
    state: web::Data<AppState>,
    query: web::Query<TenantFilter>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.tenants.list(&query).await?))
}

pub async fn get_tenant(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.tenants.get_detail(path.into_inner()).await?))
}

pub async fn create_tenant(
    state: web::Data<AppState>,
    body: web::Json<TenantInput>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Created().json(state.tenants.create(&body).await?))
}

pub async fn update_tenant(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<TenantInput>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.tenants.update(path.into_inner(), &body).await?))
}

/// 삭제 = 비활성화
pub async fn delete_tenant(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.tenants.deactivate(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_tenant_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/tenants")
            .route("", web::get().to(list_tenants))
            .route("", web::post().to(create_tenant))
            .route("/{id}", web::get().to(get_tenant))
            .route("/{id}", web::put().to(update_tenant))
            .route("/{id}", web::delete().to(delete_tenant)),
    );
}
