//! REST API 핸들러
//!
//! 모든 핸들러는 `AppResult<HttpResponse>`를 돌려주고, 에러는
//! `AppError`의 `ResponseError` 구현으로 `{error, message}` 본문이 됩니다.

pub mod auth_api;
pub mod billing_api;
pub mod contract_api;
pub mod dashboard_api;
pub mod health_api;
pub mod room_api;
pub mod settlement_api;
pub mod signing_api;
pub mod tenant_api;
pub mod transaction_api;

use actix_web::web;

/// 전체 라우트 등록
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    health_api::configure_health_routes(cfg);
    auth_api::configure_auth_routes(cfg);
    dashboard_api::configure_dashboard_routes(cfg);
    room_api::configure_room_routes(cfg);
    tenant_api::configure_tenant_routes(cfg);
    contract_api::configure_contract_routes(cfg);
    transaction_api::configure_transaction_routes(cfg);
    billing_api::configure_billing_routes(cfg);
    settlement_api::configure_settlement_routes(cfg);
    signing_api::configure_signing_routes(cfg);
}
