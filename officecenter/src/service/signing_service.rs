//! 전자서명 세션 서비스
//!
//! 서명 링크 토큰은 256비트 난수(hex)이며 DB에는 SHA-256 해시만 저장합니다.
//! 흐름: 대기 → (입주사 서명) 입주사서명 → (관리자 서명) 완료
//! 링크 기한은 대기 단계에만 적용되며, 기한이 지난 대기 세션은 만료 처리됩니다.

use crate::service::contract_service::fetch_contract;
use crate::service::document_service::{ContractRenderer, SignatureImages};
use crate::service::signature_storage::{SignatureStorage, Signer};
use crate::service::tenant_service::fetch_tenant;
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::config::DbConnection;
use shared::model::{ContractDetail, SigningSession, SigningStatus};
use shared::security::validation::require_text;
use shared::tool::error::{AppError, AppResult};
use sqlx::MySqlConnection;
use tracing::{info, warn};

const SIGNING_COLUMNS: &str = "id, contract_id, token_hash, status, tenant_signer_name, \
     tenant_signature_path, tenant_signed_at, tenant_ip, admin_signature_path, admin_signed_at, \
     admin_id, expires_at, created_by, created_at, updated_at";

const MAX_EXPIRES_IN_DAYS: u64 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub expires_in_days: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionFilter {
    pub contract_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct TenantSignRequest {
    pub signer_name: String,
    pub signature: String,
    #[serde(default)]
    pub agreed: bool,
}

impl TenantSignRequest {
    /// DB 조회 전에 확인할 수 있는 입력 검증
    pub fn validate(&self) -> AppResult<()> {
        if !self.agreed {
            return Err(AppError::InvalidInput(
                "계약 내용에 동의해야 서명할 수 있습니다".to_string(),
            ));
        }
        require_text("signer_name", &self.signer_name)?;
        require_text("signature", &self.signature)?;
        Ok(())
    }
}

/// 세션 생성 결과 - 원본 토큰은 이 응답에서만 확인할 수 있습니다.
#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub session: SigningSession,
    pub token: String,
    pub signing_url: String,
}

/// 입주사에게 보여주는 서명 화면 정보
#[derive(Debug, Serialize)]
pub struct SigningView {
    pub session: SigningSession,
    pub contract: ContractDetail,
    pub document: String,
}

/// 서명 링크 토큰 생성 (32바이트 난수 → hex 64자)
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// 토큰 해시 (SHA-256 hex)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct SigningService {
    pool: DbConnection,
    storage: SignatureStorage,
    renderer: ContractRenderer,
    public_base_url: String,
    default_expiration_days: u64,
}

impl SigningService {
    pub fn new(
        pool: DbConnection,
        storage: SignatureStorage,
        renderer: ContractRenderer,
        public_base_url: impl Into<String>,
        default_expiration_days: u64,
    ) -> Self {
        Self {
            pool,
            storage,
            renderer,
            public_base_url: public_base_url.into(),
            default_expiration_days,
        }
    }

    /// 진행중 계약의 서명 세션 생성. 열린 세션이 있으면 거부합니다.
    pub async fn create_session(
        &self,
        contract_id: i64,
        request: &CreateSessionRequest,
        admin_id: i64,
    ) -> AppResult<CreatedSession> {
        let days = request.expires_in_days.unwrap_or(self.default_expiration_days);
        if !(1..=MAX_EXPIRES_IN_DAYS).contains(&days) {
            return Err(AppError::InvalidInput(format!(
                "expires_in_days는 1~{} 사이여야 합니다",
                MAX_EXPIRES_IN_DAYS
            )));
        }

        let mut tx = self.pool.begin().await?;

        let contract = fetch_contract(&mut tx, contract_id, true).await?.contract;
        if !contract.is_in_progress() {
            return Err(AppError::InvalidState(
                "진행중인 계약만 서명을 요청할 수 있습니다".to_string(),
            ));
        }

        expire_stale_sessions(&mut tx, Some(contract_id)).await?;

        let open: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM signing_sessions WHERE contract_id = ? AND status IN ('대기', '입주사서명')",
        )
        .bind(contract_id)
        .fetch_one(&mut *tx)
        .await?;
        if open > 0 {
            return Err(AppError::InvalidState(
                "진행 중인 서명 세션이 이미 있습니다".to_string(),
            ));
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(days as i64);
        let result = sqlx::query(
            "INSERT INTO signing_sessions (contract_id, token_hash, status, expires_at, created_by) VALUES (?, ?, '대기', ?, ?)",
        )
        .bind(contract_id)
        .bind(hash_token(&token))
        .bind(expires_at)
        .bind(admin_id)
        .execute(&mut *tx)
        .await?;
        let session_id = result.last_insert_id() as i64;

        let session = fetch_session(&mut tx, session_id).await?;
        tx.commit().await?;

        info!(session_id, contract_id, admin_id, "서명 세션 생성");
        Ok(CreatedSession {
            session,
            signing_url: format!("{}/sign/{}", self.public_base_url, token),
            token,
        })
    }

    pub async fn list(&self, filter: &SessionFilter) -> AppResult<Vec<SigningSession>> {
        let mut conn = self.pool.acquire().await?;
        expire_stale_sessions(&mut conn, filter.contract_id).await?;

        let sql = format!(
            "SELECT {} FROM signing_sessions WHERE (? IS NULL OR contract_id = ?) ORDER BY created_at DESC, id DESC",
            SIGNING_COLUMNS
        );
        let rows = sqlx::query_as::<_, SigningSession>(&sql)
            .bind(filter.contract_id)
            .bind(filter.contract_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> AppResult<SigningSession> {
        let mut conn = self.pool.acquire().await?;
        fetch_session(&mut conn, id).await
    }

    /// 관리자 서명 - 입주사 서명이 끝난 세션만 완료 처리합니다.
    pub async fn admin_sign(
        &self,
        id: i64,
        request: &SignatureRequest,
        admin_id: i64,
    ) -> AppResult<SigningSession> {
        let mut tx = self.pool.begin().await?;

        let session = fetch_session_for_update(&mut tx, id).await?;
        if session.status != SigningStatus::TenantSigned {
            return Err(AppError::InvalidState(format!(
                "입주사 서명 후에 관리자 서명을 할 수 있습니다 (현재: {})",
                session.status
            )));
        }

        let path = self
            .storage
            .save(Signer::Admin, session.id, &request.signature)
            .await?;

        sqlx::query(
            "UPDATE signing_sessions SET status = '완료', admin_signature_path = ?, admin_signed_at = CURRENT_TIMESTAMP, admin_id = ? WHERE id = ?",
        )
        .bind(&path)
        .bind(admin_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE contracts SET signed_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(session.contract_id)
            .execute(&mut *tx)
            .await?;

        let updated = fetch_session(&mut tx, id).await?;
        tx.commit().await?;

        info!(session_id = id, contract_id = session.contract_id, admin_id, "전자서명 완료");
        Ok(updated)
    }

    pub async fn cancel(&self, id: i64) -> AppResult<SigningSession> {
        let mut tx = self.pool.begin().await?;

        let session = fetch_session_for_update(&mut tx, id).await?;
        if !session.status.is_open() {
            return Err(AppError::InvalidState(format!(
                "취소할 수 없는 서명 세션입니다 (현재: {})",
                session.status
            )));
        }

        sqlx::query("UPDATE signing_sessions SET status = '취소' WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let updated = fetch_session(&mut tx, id).await?;
        tx.commit().await?;

        info!(session_id = id, "서명 세션 취소");
        Ok(updated)
    }

    /// 계약서 HTML. 가장 최근 서명 세션의 서명 정보를 반영합니다.
    pub async fn contract_document(&self, contract_id: i64) -> AppResult<String> {
        let mut conn = self.pool.acquire().await?;

        let contract = fetch_contract(&mut conn, contract_id, false).await?;
        let tenant = fetch_tenant(&mut conn, contract.contract.tenant_id).await?;

        let sql = format!(
            "SELECT {} FROM signing_sessions WHERE contract_id = ? AND status <> '취소' \
             ORDER BY created_at DESC, id DESC LIMIT 1",
            SIGNING_COLUMNS
        );
        let session = sqlx::query_as::<_, SigningSession>(&sql)
            .bind(contract_id)
            .fetch_optional(&mut *conn)
            .await?;

        let images = self.signature_images(session.as_ref()).await;
        self.renderer
            .render(&contract, &tenant, session.as_ref(), &images)
    }

    /// 공개 서명 화면 조회 (토큰)
    pub async fn view(&self, token: &str) -> AppResult<SigningView> {
        let mut conn = self.pool.acquire().await?;

        let session = self.open_by_token(&mut conn, token).await?;
        if session.status == SigningStatus::Cancelled {
            return Err(AppError::InvalidState("취소된 서명 요청입니다".to_string()));
        }

        let contract = fetch_contract(&mut conn, session.contract_id, false).await?;
        let tenant = fetch_tenant(&mut conn, contract.contract.tenant_id).await?;
        let images = self.signature_images(Some(&session)).await;
        let document = self
            .renderer
            .render(&contract, &tenant, Some(&session), &images)?;

        Ok(SigningView {
            session,
            contract,
            document,
        })
    }

    /// 입주사 서명 (공개, 토큰)
    pub async fn tenant_sign(
        &self,
        token: &str,
        request: &TenantSignRequest,
        client_ip: Option<String>,
    ) -> AppResult<SigningSession> {
        request.validate()?;

        let session_id = {
            let mut conn = self.pool.acquire().await?;
            self.open_by_token(&mut conn, token).await?.id
        };

        let mut tx = self.pool.begin().await?;

        let session = fetch_session_for_update(&mut tx, session_id).await?;
        if session.link_expired_at(Utc::now()) {
            return Err(AppError::Expired("서명 링크가 만료되었습니다".to_string()));
        }
        if session.status != SigningStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "서명할 수 없는 상태입니다 (현재: {})",
                session.status
            )));
        }

        let path = self
            .storage
            .save(Signer::Tenant, session.id, &request.signature)
            .await?;

        sqlx::query(
            "UPDATE signing_sessions SET status = '입주사서명', tenant_signer_name = ?, tenant_signature_path = ?, \
             tenant_signed_at = CURRENT_TIMESTAMP, tenant_ip = ? WHERE id = ? AND status = '대기'",
        )
        .bind(request.signer_name.trim())
        .bind(&path)
        .bind(&client_ip)
        .bind(session.id)
        .execute(&mut *tx)
        .await?;

        let updated = fetch_session(&mut tx, session.id).await?;
        tx.commit().await?;

        info!(
            session_id = session.id,
            contract_id = session.contract_id,
            signer = %request.signer_name.trim(),
            "입주사 서명"
        );
        Ok(updated)
    }

    /// 토큰으로 세션 조회. 기한이 지난 대기 세션은 만료 처리 후 410.
    async fn open_by_token(&self, conn: &mut MySqlConnection, token: &str) -> AppResult<SigningSession> {
        let sql = format!(
            "SELECT {} FROM signing_sessions WHERE token_hash = ?",
            SIGNING_COLUMNS
        );
        let session = sqlx::query_as::<_, SigningSession>(&sql)
            .bind(hash_token(token.trim()))
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("서명 요청".to_string()))?;

        if session.link_expired_at(Utc::now()) {
            sqlx::query("UPDATE signing_sessions SET status = '만료' WHERE id = ? AND status = '대기'")
                .bind(session.id)
                .execute(&mut *conn)
                .await?;
            warn!(session_id = session.id, "만료된 서명 링크 접근");
            return Err(AppError::Expired("서명 링크가 만료되었습니다".to_string()));
        }
        if session.status == SigningStatus::Expired {
            return Err(AppError::Expired("서명 링크가 만료되었습니다".to_string()));
        }

        Ok(session)
    }

    /// 문서에 넣을 서명 이미지. 파일을 읽지 못하면 이미지 없이 렌더링합니다.
    async fn signature_images(&self, session: Option<&SigningSession>) -> SignatureImages {
        let Some(session) = session else {
            return SignatureImages::default();
        };
        SignatureImages {
            tenant: self
                .load_image(session.id, session.tenant_signature_path.as_deref())
                .await,
            admin: self
                .load_image(session.id, session.admin_signature_path.as_deref())
                .await,
        }
    }

    async fn load_image(&self, session_id: i64, path: Option<&str>) -> Option<String> {
        let path = path?;
        match self.storage.load_data_url(path).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(session_id, path, "서명 이미지 읽기 실패: {}", e);
                None
            }
        }
    }
}

async fn fetch_session(conn: &mut MySqlConnection, id: i64) -> AppResult<SigningSession> {
    let sql = format!("SELECT {} FROM signing_sessions WHERE id = ?", SIGNING_COLUMNS);
    sqlx::query_as::<_, SigningSession>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("서명 세션".to_string()))
}

async fn fetch_session_for_update(conn: &mut MySqlConnection, id: i64) -> AppResult<SigningSession> {
    let sql = format!(
        "SELECT {} FROM signing_sessions WHERE id = ? FOR UPDATE",
        SIGNING_COLUMNS
    );
    sqlx::query_as::<_, SigningSession>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("서명 세션".to_string()))
}

/// 기한이 지난 대기 세션을 만료 상태로 바꿉니다. 입주사가 서명한 세션은 건드리지 않습니다.
async fn expire_stale_sessions(conn: &mut MySqlConnection, contract_id: Option<i64>) -> AppResult<u64> {
    let expired = sqlx::query(
        "UPDATE signing_sessions SET status = '만료' \
         WHERE status = '대기' AND expires_at <= ? AND (? IS NULL OR contract_id = ?)",
    )
    .bind(Utc::now())
    .bind(contract_id)
    .bind(contract_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_256_bit_hex() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_hash_token_is_stable_sha256() {
        let hash = hash_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("abc"), hash);
    }

    #[test]
    fn test_tenant_sign_requires_agreement() {
        let request = TenantSignRequest {
            signer_name: "김대표".to_string(),
            signature: "data:image/png;base64,AAAA".to_string(),
            agreed: false,
        };
        assert!(matches!(request.validate(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_tenant_sign_requires_name() {
        let request = TenantSignRequest {
            signer_name: " ".to_string(),
            signature: "data:image/png;base64,AAAA".to_string(),
            agreed: true,
        };
        assert!(matches!(request.validate(), Err(AppError::MissingField(_))));
    }
}
