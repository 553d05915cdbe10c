//! 관리자 인증 API

use crate::auth_middleware::{bearer_token, AuthAdmin};
use crate::server::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use shared::model::AdminUser;
use shared::security::validation::require_text;
use shared::tool::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub admin: AdminUser,
}

/// 로그인
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let username = require_text("username", &body.username)?;
    require_text("password", &body.password)?;

    let admin = state.admins.authenticate(username, &body.password).await?;
    let issued = state
        .jwt
        .create_access_token(admin.id, &admin.username, &admin.role)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: issued.access_token,
        token_type: issued.token_type,
        expires_at: issued.expires_at,
        admin,
    }))
}

/// 로그아웃 - 현재 토큰을 만료 시각까지 블랙리스트에 올립니다.
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
    _admin: AuthAdmin,
) -> AppResult<HttpResponse> {
    let token = bearer_token(&req)?;
    state.jwt.blacklist_token(&token).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn me(state: web::Data<AppState>, admin: AuthAdmin) -> AppResult<HttpResponse> {
    let profile = state.admins.get(admin.admin_id()?).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn change_password(
    state: web::Data<AppState>,
    admin: AuthAdmin,
    body: web::Json<PasswordChangeRequest>,
) -> AppResult<HttpResponse> {
    state
        .admins
        .change_password(
            admin.admin_id()?,
            &body.current_password,
            &body.new_password,
            state.security.bcrypt_rounds,
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me))
            .route("/password", web::put().to(change_password)),
    );
}
