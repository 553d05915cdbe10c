//! 입주사 서비스

use serde::{Deserialize, Serialize};
use shared::config::DbConnection;
use shared::model::{ContractDetail, Tenant, TenantType};
use shared::security::validation::{
    normalize_optional, require_text, validate_business_number, validate_email, validate_phone,
};
use shared::tool::error::{AppError, AppResult};
use sqlx::MySqlConnection;
use tracing::info;

const TENANT_COLUMNS: &str = "id, company_name, representative, business_number, tenant_type, \
     is_resident, phone, email, address, memo, is_active, created_at, updated_at";

#[derive(Debug, Default, Deserialize)]
pub struct TenantFilter {
    /// 회사명/대표자/사업자번호 검색어
    pub q: Option<String>,
    pub is_resident: Option<bool>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantInput {
    pub company_name: String,
    pub representative: Option<String>,
    pub business_number: Option<String>,
    #[serde(default = "default_tenant_type")]
    pub tenant_type: TenantType,
    #[serde(default = "default_resident")]
    pub is_resident: bool,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub memo: Option<String>,
}

fn default_tenant_type() -> TenantType {
    TenantType::Corporation
}

fn default_resident() -> bool {
    true
}

impl TenantInput {
    /// 검증 후 빈 문자열을 정리한 입력을 돌려줍니다.
    pub fn normalized(&self) -> AppResult<TenantInput> {
        let company_name = require_text("company_name", &self.company_name)?.to_string();

        let business_number = normalize_optional(self.business_number.clone());
        if let Some(number) = &business_number {
            validate_business_number(number)?;
        }
        let phone = normalize_optional(self.phone.clone());
        if let Some(phone) = &phone {
            validate_phone(phone)?;
        }
        let email = normalize_optional(self.email.clone());
        if let Some(email) = &email {
            validate_email(email)?;
        }

        Ok(TenantInput {
            company_name,
            representative: normalize_optional(self.representative.clone()),
            business_number,
            tenant_type: self.tenant_type,
            is_resident: self.is_resident,
            phone,
            email,
            address: normalize_optional(self.address.clone()),
            memo: normalize_optional(self.memo.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TenantDetail {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub contracts: Vec<ContractDetail>,
}

#[derive(Clone)]
pub struct TenantService {
    pool: DbConnection,
}

/// 부분 일치 LIKE 패턴. 입력의 `%`, `_`는 문자 그대로 찾도록 `!`로 이스케이프합니다.
fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for ch in q.chars() {
        if matches!(ch, '!' | '%' | '_') {
            pattern.push('!');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl TenantService {
    pub fn new(pool: DbConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &TenantFilter) -> AppResult<Vec<Tenant>> {
        let sql = format!(
            "SELECT {} FROM tenants \
             WHERE (? IS NULL OR company_name LIKE ? ESCAPE '!' OR representative LIKE ? ESCAPE '!' \
                    OR business_number LIKE ? ESCAPE '!') \
               AND (? IS NULL OR is_resident = ?) \
               AND (? OR is_active = TRUE) \
             ORDER BY company_name",
            TENANT_COLUMNS
        );
        let q = normalize_optional(filter.q.clone());
        let pattern = q.as_deref().map(contains_pattern);

        let tenants = sqlx::query_as::<_, Tenant>(&sql)
            .bind(&q)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(filter.is_resident)
            .bind(filter.is_resident)
            .bind(filter.include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(tenants)
    }

    pub async fn get(&self, id: i64) -> AppResult<Tenant> {
        let mut conn = self.pool.acquire().await?;
        fetch_tenant(&mut conn, id).await
    }

    pub async fn get_detail(&self, id: i64) -> AppResult<TenantDetail> {
        let tenant = self.get(id).await?;
        let contracts = sqlx::query_as::<_, ContractDetail>(
            "SELECT c.*, r.room_number, t.company_name FROM contracts c \
             JOIN rooms r ON r.id = c.room_id JOIN tenants t ON t.id = c.tenant_id \
             WHERE c.tenant_id = ? ORDER BY c.start_date DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TenantDetail { tenant, contracts })
    }

    pub async fn create(&self, input: &TenantInput) -> AppResult<Tenant> {
        let input = input.normalized()?;

        let result = sqlx::query(
            "INSERT INTO tenants (company_name, representative, business_number, tenant_type, is_resident, phone, email, address, memo) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.company_name)
        .bind(&input.representative)
        .bind(&input.business_number)
        .bind(input.tenant_type.as_str())
        .bind(input.is_resident)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.memo)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        info!(tenant_id = id, company = %input.company_name, "입주사 등록");
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: &TenantInput) -> AppResult<Tenant> {
        let input = input.normalized()?;
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE tenants SET company_name = ?, representative = ?, business_number = ?, tenant_type = ?, \
             is_resident = ?, phone = ?, email = ?, address = ?, memo = ? WHERE id = ?",
        )
        .bind(&input.company_name)
        .bind(&input.representative)
        .bind(&input.business_number)
        .bind(input.tenant_type.as_str())
        .bind(input.is_resident)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.memo)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // 입주 중인 호실에 표시되는 회사명도 맞춰 줍니다.
        sqlx::query("UPDATE rooms SET current_company_name = ? WHERE current_tenant_id = ?")
            .bind(&input.company_name)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get(id).await
    }

    /// 입주사 비활성화. 진행중 계약이 있으면 거부합니다.
    pub async fn deactivate(&self, id: i64) -> AppResult<()> {
        self.get(id).await?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contracts WHERE tenant_id = ? AND status = '진행중' AND is_active = TRUE",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if active > 0 {
            return Err(AppError::InvalidState(
                "진행중인 계약이 있는 입주사는 삭제할 수 없습니다".to_string(),
            ));
        }

        sqlx::query("UPDATE tenants SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!(tenant_id = id, "입주사 비활성화");
        Ok(())
    }
}

pub(crate) async fn fetch_tenant(conn: &mut MySqlConnection, id: i64) -> AppResult<Tenant> {
    let sql = format!("SELECT {} FROM tenants WHERE id = ?", TENANT_COLUMNS);
    sqlx::query_as::<_, Tenant>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("입주사".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TenantInput {
        TenantInput {
            company_name: "  한빛상사 ".to_string(),
            representative: Some("".to_string()),
            business_number: Some("123-45-67890".to_string()),
            tenant_type: TenantType::Corporation,
            is_resident: true,
            phone: Some("010-1234-5678".to_string()),
            email: None,
            address: None,
            memo: None,
        }
    }

    #[test]
    fn test_normalized_trims_and_drops_empty() {
        let normalized = input().normalized().unwrap();
        assert_eq!(normalized.company_name, "한빛상사");
        assert_eq!(normalized.representative, None);
    }

    #[test]
    fn test_company_name_required() {
        let mut bad = input();
        bad.company_name = "   ".to_string();
        assert!(matches!(bad.normalized(), Err(AppError::MissingField(_))));
    }

    #[test]
    fn test_business_number_format() {
        let mut bad = input();
        bad.business_number = Some("1234567890".to_string());
        assert!(matches!(bad.normalized(), Err(AppError::InvalidFormat(_))));
    }

    #[test]
    fn test_email_format() {
        let mut bad = input();
        bad.email = Some("not-an-email".to_string());
        assert!(bad.normalized().is_err());
    }

    #[test]
    fn test_defaults_from_json() {
        let parsed: TenantInput = serde_json::from_str(r#"{"company_name":"개인사업자"}"#).unwrap();
        assert_eq!(parsed.tenant_type, TenantType::Corporation);
        assert!(parsed.is_resident);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("한빛"), "%한빛%");
        assert_eq!(contains_pattern("_"), "%!_%");
        assert_eq!(contains_pattern("50%"), "%50!%%");
        assert_eq!(contains_pattern("A!B"), "%A!!B%");
    }
}
