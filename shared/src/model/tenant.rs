//! 입주사 모델

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

string_enum! {
    /// 입주사 구분
    TenantType("입주사 구분") {
        Corporation => "법인",
        Individual => "개인",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tenant {
    pub id: i64,
    pub company_name: String,
    pub representative: Option<String>,
    pub business_number: Option<String>,
    #[sqlx(try_from = "String")]
    pub tenant_type: TenantType,
    /// 상주 여부 (비상주 입주사는 POST BOX 등 주소지만 사용)
    pub is_resident: bool,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub memo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
