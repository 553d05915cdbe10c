//! 오피스센터 임대 관리 서버
//!
//! 호실, 입주사, 계약, 수입/지출, 월별 청구, 정산, 전자서명을 관리하는
//! REST API 서버입니다.

pub mod api;
pub mod auth_middleware;
pub mod domain;
pub mod server;
pub mod service;


/// 내장 마이그레이션 (`officecenter/migrations`)
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
