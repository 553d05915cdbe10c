//! 전자서명 API
//!
//! `/api/signing-sessions`는 관리자용, `/api/signing/{token}`은 입주사 공개 경로입니다.

use crate::auth_middleware::AuthAdmin;
use crate::server::AppState;
use crate::service::signing_service::{SessionFilter, SignatureRequest, TenantSignRequest};
use actix_web::{web, HttpRequest, HttpResponse};
use shared::tool::error::AppResult;

pub async fn list_sessions(
    state: web::Data<AppState>,
    query: web::Query<SessionFilter>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.signing.list(&query).await?))
}

pub async fn get_session(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.signing.get(path.into_inner()).await?))
}

pub async fn admin_sign(
    state: web::Data<AppState>,
    admin: AuthAdmin,
    path: web::Path<i64>,
    body: web::Json<SignatureRequest>,
) -> AppResult<HttpResponse> {
    let session = state
        .signing
        .admin_sign(path.into_inner(), &body, admin.admin_id()?)
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn cancel_session(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.signing.cancel(path.into_inner()).await?))
}

/// 공개: 서명 화면
pub async fn view_signing(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.signing.view(&path).await?))
}

/// 공개: 입주사 서명
pub async fn tenant_sign(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<TenantSignRequest>,
) -> AppResult<HttpResponse> {
    let client_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string());
    let session = state.signing.tenant_sign(&path, &body, client_ip).await?;
    Ok(HttpResponse::Ok().json(session))
}

pub fn configure_signing_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/signing-sessions")
            .route("", web::get().to(list_sessions))
            .route("/{id}", web::get().to(get_session))
            .route("/{id}/admin-sign", web::post().to(admin_sign))
            .route("/{id}/cancel", web::post().to(cancel_session)),
    )
    .service(
        web::scope("/api/signing")
            .route("/{token}", web::get().to(view_signing))
            .route("/{token}/sign", web::post().to(tenant_sign)),
    );
}
