//! 보안 모듈 - JWT, 비밀번호 해시, 입력검증
//!
//! 관리자 인증과 입력값 검증에 필요한 기능을 제공합니다.

pub mod jwt;
pub mod password;
pub mod validation;

pub use jwt::{Claims, IssuedToken, JwtManager};
pub use password::{hash_password, validate_password_strength, verify_password};

use crate::config::env_parse;
use crate::tool::error::AppError;
use thiserror::Error;

/// 보안 관련 에러
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl From<SecurityError> for AppError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::InvalidInput(msg) => AppError::InvalidInput(msg),
            SecurityError::TokenExpired => AppError::TokenExpired("다시 로그인해 주세요".to_string()),
            SecurityError::InvalidToken(msg) => AppError::AuthError(msg),
        }
    }
}

const DEVELOPMENT_JWT_SECRET: &str = "officecenter-development-only-jwt-key-0123456789";

/// 보안 설정
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT 비밀키
    pub jwt_secret: String,
    /// JWT 만료시간 (시간)
    pub jwt_expiration_hours: u64,
    /// 전자서명 링크 유효기간 (일)
    pub signing_expiration_days: u64,
    /// bcrypt 라운드
    pub bcrypt_rounds: u32,
}

impl SecurityConfig {
    /// 개발/테스트용 설정
    pub fn development() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 12,
            signing_expiration_days: 7,
            bcrypt_rounds: bcrypt::DEFAULT_COST,
        }
    }

    /// 환경변수에서 보안 설정 로드
    ///
    /// 릴리스 빌드에서는 `JWT_SECRET_KEY`가 반드시 있어야 합니다.
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = match std::env::var("JWT_SECRET_KEY") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!(
                    "⚠️  JWT_SECRET_KEY가 없어 개발용 키를 사용합니다. 운영 환경에서는 반드시 설정하세요."
                );
                DEVELOPMENT_JWT_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::Configuration(
                    "JWT_SECRET_KEY environment variable is required".to_string(),
                ))
            }
        };

        let config = Self {
            jwt_secret,
            jwt_expiration_hours: env_parse("JWT_EXPIRATION_HOURS", 12)?,
            signing_expiration_days: env_parse("SIGNING_EXPIRATION_DAYS", 7)?,
            bcrypt_rounds: env_parse("BCRYPT_ROUNDS", bcrypt::DEFAULT_COST)?,
        };
        config.validate()?;

        tracing::info!("🔐 Security Configuration Loaded:");
        tracing::info!("  └─ JWT Expiration: {} hours", config.jwt_expiration_hours);
        tracing::info!("  └─ Signing Link Expiration: {} days", config.signing_expiration_days);
        tracing::info!("  └─ BCrypt Rounds: {}", config.bcrypt_rounds);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.len() < 32 {
            return Err(AppError::Configuration(format!(
                "JWT_SECRET_KEY must be at least 32 characters. Current: {}",
                self.jwt_secret.len()
            )));
        }
        if self.jwt_expiration_hours == 0 {
            return Err(AppError::Configuration(
                "JWT_EXPIRATION_HOURS must be greater than 0".to_string(),
            ));
        }
        if self.signing_expiration_days == 0 {
            return Err(AppError::Configuration(
                "SIGNING_EXPIRATION_DAYS must be greater than 0".to_string(),
            ));
        }
        if !(4..=15).contains(&self.bcrypt_rounds) {
            return Err(AppError::Configuration(
                "BCRYPT_ROUNDS must be between 4 and 15".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_config_is_valid() {
        assert!(SecurityConfig::development().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = SecurityConfig::development();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_security_error_conversion() {
        let err: AppError = SecurityError::TokenExpired.into();
        assert!(matches!(err, AppError::TokenExpired(_)));
        let err: AppError = SecurityError::InvalidToken("bad".into()).into();
        assert!(matches!(err, AppError::AuthError(_)));
    }
}
