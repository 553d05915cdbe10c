//! JWT 토큰 관리
//!
//! - 관리자 Access 토큰 발급/검증 (HS256)
//! - 로그아웃 토큰 블랙리스트 (만료 시각까지 보관)

use crate::security::{SecurityConfig, SecurityError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

const ISSUER: &str = "officecenter";

/// JWT 클레임 구조
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// 관리자 ID
    pub sub: String,
    /// 로그인 아이디
    pub username: String,
    /// 역할 (admin, manager)
    pub role: String,
    /// 토큰 발급 시간
    pub iat: i64,
    /// 토큰 만료 시간
    pub exp: i64,
    /// JWT ID (고유 식별자)
    pub jti: String,
    /// 발급자
    pub iss: String,
}

impl Claims {
    /// 관리자 ID (숫자)
    pub fn admin_id(&self) -> Result<i64, SecurityError> {
        self.sub
            .parse()
            .map_err(|_| SecurityError::InvalidToken("subject is not an admin id".to_string()))
    }
}

/// 발급된 토큰
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT 관리자
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: Duration,
    /// 블랙리스트 (jti → 만료 시각)
    blacklist: Arc<RwLock<HashMap<String, i64>>>,
}

impl JwtManager {
    /// 새 JWT 관리자 생성
    pub fn new(config: &SecurityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            expiration: Duration::hours(config.jwt_expiration_hours as i64),
            blacklist: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Access 토큰 생성
    pub fn create_access_token(
        &self,
        admin_id: i64,
        username: &str,
        role: &str,
    ) -> Result<IssuedToken, SecurityError> {
        let now = Utc::now();
        let expires_at = now + self.expiration;

        let claims = Claims {
            sub: admin_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: ISSUER.to_string(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SecurityError::InvalidToken(format!("Token encoding failed: {e}")))?;

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
        })
    }

    /// 토큰 검증 및 클레임 추출
    pub async fn verify_token(&self, token: &str) -> Result<Claims, SecurityError> {
        let claims = self.decode(token)?;

        if self.blacklist.read().await.contains_key(&claims.jti) {
            return Err(SecurityError::InvalidToken(
                "Token is blacklisted".to_string(),
            ));
        }

        Ok(claims)
    }

    /// 토큰 블랙리스트 추가 (로그아웃)
    pub async fn blacklist_token(&self, token: &str) -> Result<(), SecurityError> {
        let claims = self.decode(token)?;

        let mut blacklist = self.blacklist.write().await;
        blacklist.insert(claims.jti.clone(), claims.exp);

        tracing::info!(
            admin_id = %claims.sub,
            jti = %claims.jti,
            "Token added to blacklist"
        );

        Ok(())
    }

    /// 만료된 토큰들을 블랙리스트에서 정리
    pub async fn cleanup_blacklist(&self) -> usize {
        let now = Utc::now().timestamp();
        let mut blacklist = self.blacklist.write().await;

        let initial_size = blacklist.len();
        blacklist.retain(|_, exp| *exp >= now);

        let cleaned = initial_size - blacklist.len();
        if cleaned > 0 {
            tracing::info!("Cleaned {} expired tokens from blacklist", cleaned);
        }
        cleaned
    }

    /// 토큰 만료 시각
    pub fn expires_at(claims: &Claims) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(claims.exp, 0).single()
    }

    fn decode(&self, token: &str) -> Result<Claims, SecurityError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
                _ => SecurityError::InvalidToken(format!("Token validation failed: {e}")),
            })
    }
}
