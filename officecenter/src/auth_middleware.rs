//! 관리자 API 인증 미들웨어
//!
//! `/api/**` 요청의 `Authorization: Bearer <JWT>` 헤더를 검증하고
//! 검증된 클레임을 요청 확장에 넣습니다. 로그인, 헬스체크,
//! 공개 서명 경로(`/api/signing/`)는 인증 없이 통과합니다.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures::future::LocalBoxFuture;
use shared::security::{Claims, JwtManager};
use shared::tool::error::AppError;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::debug;

const PUBLIC_PATHS: [&str; 2] = ["/health", "/api/auth/login"];
const PUBLIC_PREFIX: &str = "/api/signing/";

/// 인증 없이 통과하는 경로인지
pub fn is_public_path(path: &str) -> bool {
    !path.starts_with("/api/") || PUBLIC_PATHS.contains(&path) || path.starts_with(PUBLIC_PREFIX)
}

/// `Authorization` 헤더에서 Bearer 토큰 추출
pub fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::AuthError("Authorization 헤더가 없습니다".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| AppError::AuthError("잘못된 Authorization 헤더".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AppError::AuthError(
            "Bearer 토큰 형식이어야 합니다".to_string(),
        )),
    }
}

/// 인증 미들웨어
pub struct AuthMiddleware {
    jwt: JwtManager,
}

impl AuthMiddleware {
    pub fn new(jwt: JwtManager) -> Self {
        Self { jwt }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt: JwtManager,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight와 공개 경로는 그대로 통과
        if req.method() == actix_web::http::Method::OPTIONS || is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let token = match bearer_token(req.request()) {
            Ok(token) => token,
            Err(err) => {
                return Box::pin(async move { Ok(reject(req, err)) });
            }
        };

        let jwt = self.jwt.clone();
        let service = self.service.clone();

        Box::pin(async move {
            match jwt.verify_token(&token).await {
                Ok(claims) => {
                    debug!(admin = %claims.username, path = req.path(), "인증 통과");
                    req.extensions_mut().insert(claims);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => Ok(reject(req, err.into())),
            }
        })
    }
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}

/// 인증된 관리자 (미들웨어가 넣은 클레임)
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Claims);

impl AuthAdmin {
    pub fn admin_id(&self) -> Result<i64, AppError> {
        Ok(self.0.admin_id()?)
    }
}

impl FromRequest for AuthAdmin {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Claims>()
                .cloned()
                .map(AuthAdmin)
                .ok_or_else(|| AppError::AuthError("인증이 필요합니다".to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/api/signing/abc123"));
        assert!(is_public_path("/favicon.ico"));
        assert!(!is_public_path("/api/auth/me"));
        assert!(!is_public_path("/api/signing-sessions"));
        assert!(!is_public_path("/api/rooms"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc.def.ghi");

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcg=="))
            .to_http_request();
        assert!(matches!(bearer_token(&req), Err(AppError::AuthError(_))));

        let req = TestRequest::default().to_http_request();
        assert!(matches!(bearer_token(&req), Err(AppError::AuthError(_))));
    }
}
