//! 서버 설정 모듈
//!
//! REST API 서버의 바인드 주소, 공개 URL, 업로드 경로 등을 관리합니다.

use crate::config::db::DbSettings;
use crate::config::{env_or, env_parse};
use crate::logging::LoggingConfig;
use crate::security::SecurityConfig;
use crate::tool::error::AppError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

// 기본값 상수
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_JSON_LIMIT: usize = 4 * 1024 * 1024;

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 전자서명 링크 생성에 쓰이는 외부 주소
    pub public_base_url: String,
    /// 서명 이미지 저장 경로
    pub upload_dir: PathBuf,
    /// 허용 CORS origin (없으면 모두 허용)
    pub cors_allowed_origin: Option<String>,
    /// JSON 요청 본문 최대 크기 (바이트)
    pub json_limit: usize,
    /// actix worker 수 (0이면 CPU 수)
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            cors_allowed_origin: None,
            json_limit: DEFAULT_JSON_LIMIT,
            workers: 0,
        }
    }
}

impl ServerConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            host: env_or("server_host", DEFAULT_SERVER_HOST),
            port: env_parse("server_port", DEFAULT_SERVER_PORT)?,
            public_base_url: env_or("PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            json_limit: env_parse("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT)?,
            workers: env_parse("SERVER_WORKERS", 0)?,
        })
    }

    /// 바인드 주소
    pub fn bind_address(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Configuration(format!("잘못된 서버 주소: {}", e)))
    }

    /// 설정 검증
    pub fn validate(&self) -> Result<(), AppError> {
        self.bind_address()?;

        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(AppError::Configuration(format!(
                "PUBLIC_BASE_URL은 http(s)로 시작해야 합니다: {}",
                self.public_base_url
            )));
        }

        if self.json_limit == 0 {
            return Err(AppError::Configuration(
                "JSON_LIMIT_BYTES는 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// 전체 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub db: DbSettings,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// `.env` + 환경변수에서 모든 설정을 읽고 검증합니다.
    pub fn from_env() -> Result<Self, AppError> {
        crate::config::load_env();

        let config = Self {
            server: ServerConfig::from_env()?,
            security: SecurityConfig::from_env()?,
            db: DbSettings::from_env()?,
            logging: LoggingConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.server.validate()?;
        self.security.validate()?;
        self.db.validate()?;
        self.logging
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address().unwrap().port(), 8080);
    }

    #[test]
    fn test_invalid_public_url() {
        let config = ServerConfig {
            public_base_url: "localhost:8080".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(config.bind_address().is_err());
    }
}
