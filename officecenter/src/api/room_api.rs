//! 호실 API

use crate::server::AppState;
use crate::service::room_service::{RoomFilter, RoomInput, RoomStatusChange};
use actix_web::{web, HttpResponse};
use shared::tool::error::AppResult;

pub async fn list_rooms(
    state: web::Data<AppState>,
    query: web::Query<RoomFilter>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.rooms.list(&query).await?))
}

/// 진행중 계약을 포함한 호실 상세
pub async fn get_room(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.rooms.get_detail(path.into_inner()).await?))
}

pub async fn create_room(
    state: web::Data<AppState>,
    body: web::Json<RoomInput>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Created().json(state.rooms.create(&body).await?))
}

pub async fn update_room(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<RoomInput>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.rooms.update(path.into_inner(), &body).await?))
}

pub async fn delete_room(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    state.rooms.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn change_room_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<RoomStatusChange>,
) -> AppResult<HttpResponse> {
    let room = state
        .rooms
        .change_status(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(room))
}

pub fn configure_room_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/rooms")
            .route("", web::get().to(list_rooms))
            .route("", web::post().to(create_room))
            .route("/{id}", web::get().to(get_room))
            .route("/{id}", web::put().to(update_room))
            .route("/{id}", web::delete().to(delete_room))
            .route("/{id}/status", web::patch().to(change_room_status)),
    );
}
