//! 공유 라이브러리
//!
//! 설정, 로깅, 보안, 데이터 모델, 공통 도구를 서버 크레이트에 제공합니다.

pub mod config;
pub mod logging;
pub mod model;
pub mod security;
pub mod tool;
