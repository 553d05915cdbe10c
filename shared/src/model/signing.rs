//! 전자서명 세션 모델

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

string_enum! {
    /// 서명 진행 상태
    SigningStatus("서명 상태") {
        Pending => "대기",
        TenantSigned => "입주사서명",
        Completed => "완료",
        Cancelled => "취소",
        Expired => "만료",
    }
}

impl SigningStatus {
    /// 아직 진행 중인(닫히지 않은) 세션
    pub fn is_open(&self) -> bool {
        matches!(self, SigningStatus::Pending | SigningStatus::TenantSigned)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SigningSession {
    pub id: i64,
    pub contract_id: i64,
    /// 서명 링크 토큰의 SHA-256 (원본 토큰은 저장하지 않음)
    #[serde(skip_serializing)]
    pub token_hash: String,
    #[sqlx(try_from = "String")]
    pub status: SigningStatus,
    pub tenant_signer_name: Option<String>,
    pub tenant_signature_path: Option<String>,
    pub tenant_signed_at: Option<DateTime<Utc>>,
    pub tenant_ip: Option<String>,
    pub admin_signature_path: Option<String>,
    pub admin_signed_at: Option<DateTime<Utc>>,
    pub admin_id: Option<i64>,
    pub expires_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SigningSession {
    /// 링크 기한은 입주사 서명 전(대기)에만 적용됩니다.
    /// 입주사가 서명한 세션은 기한이 지나도 관리자 서명으로 완료할 수 있습니다.
    pub fn link_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SigningStatus::Pending && self.expires_at <= now
    }
}
