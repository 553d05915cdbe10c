use crate::server::AppState;
use actix_web::{web, HttpResponse};
use shared::tool::error::AppResult;

pub async fn dashboard(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.dashboard.summary().await?))
}

pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/dashboard", web::get().to(dashboard));
}
