//! 거래(수입/지출) 서비스
//!
//! 부가세는 `round(금액 - 금액/1.1)`로 계산하며, 정산이 확정된 월의 거래는 변경할 수 없습니다.

use crate::service::settlement_service::ensure_month_open;
use chrono::NaiveDate;
use serde::Deserialize;
use shared::config::DbConnection;
use shared::model::{Transaction, TransactionCategory, TransactionType};
use shared::security::validation::{normalize_optional, require_positive};
use shared::tool::error::{AppError, AppResult};
use shared::tool::{split_vat, YearMonth};
use sqlx::MySqlConnection;
use tracing::info;

const TRANSACTION_COLUMNS: &str = "id, transaction_date, transaction_type, category, amount, \
     supply_amount, vat, description, payment_method, contract_id, tenant_id, billing_id, \
     created_at, updated_at";

#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    pub month: Option<YearMonth>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    pub contract_id: Option<i64>,
    pub tenant_id: Option<i64>,
}

/// 거래 등록/수정 입력
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    /// 부가세 포함 금액
    pub amount: i64,
    /// `false`면 부가세 없이 공급가액 = 금액
    #[serde(default = "default_vat_included")]
    pub vat_included: bool,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub contract_id: Option<i64>,
    pub tenant_id: Option<i64>,
}

fn default_vat_included() -> bool {
    true
}

/// 저장 직전의 거래 값 (부가세 계산 완료)
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    pub amount: i64,
    pub supply_amount: i64,
    pub vat: i64,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub contract_id: Option<i64>,
    pub tenant_id: Option<i64>,
    pub billing_id: Option<i64>,
}

impl TransactionDraft {
    /// 부가세 포함 수입 거래 (청구 입금, 보증금 전환)
    pub fn income(
        transaction_date: NaiveDate,
        category: TransactionCategory,
        amount: i64,
        description: String,
    ) -> Self {
        let (supply_amount, vat) = split_vat(amount);
        Self {
            transaction_date,
            transaction_type: TransactionType::Income,
            category,
            amount,
            supply_amount,
            vat,
            description: Some(description),
            payment_method: None,
            contract_id: None,
            tenant_id: None,
            billing_id: None,
        }
    }
}

impl TransactionInput {
    pub fn to_draft(&self) -> AppResult<TransactionDraft> {
        require_positive("금액", self.amount)?;

        let (supply_amount, vat) = if self.vat_included {
            split_vat(self.amount)
        } else {
            (self.amount, 0)
        };

        Ok(TransactionDraft {
            transaction_date: self.transaction_date,
            transaction_type: self.transaction_type,
            category: self.category,
            amount: self.amount,
            supply_amount,
            vat,
            description: normalize_optional(self.description.clone()),
            payment_method: normalize_optional(self.payment_method.clone()),
            contract_id: self.contract_id,
            tenant_id: self.tenant_id,
            billing_id: None,
        })
    }
}

#[derive(Clone)]
pub struct TransactionService {
    pool: DbConnection,
}

impl TransactionService {
    pub fn new(pool: DbConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &TransactionFilter) -> AppResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions \
             WHERE (? IS NULL OR transaction_date BETWEEN ? AND ?) \
               AND (? IS NULL OR transaction_type = ?) \
               AND (? IS NULL OR category = ?) \
               AND (? IS NULL OR contract_id = ?) \
               AND (? IS NULL OR tenant_id = ?) \
             ORDER BY transaction_date DESC, id DESC",
            TRANSACTION_COLUMNS
        );
        let month = filter.month.map(|m| m.to_string());
        let first = filter.month.map(|m| m.first_day());
        let last = filter.month.map(|m| m.last_day());
        let kind = filter.transaction_type.map(|t| t.as_str());
        let category = filter.category.map(|c| c.as_str());

        let rows = sqlx::query_as::<_, Transaction>(&sql)
            .bind(&month)
            .bind(first)
            .bind(last)
            .bind(kind)
            .bind(kind)
            .bind(category)
            .bind(category)
            .bind(filter.contract_id)
            .bind(filter.contract_id)
            .bind(filter.tenant_id)
            .bind(filter.tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> AppResult<Transaction> {
        let mut conn = self.pool.acquire().await?;
        fetch_transaction(&mut conn, id).await
    }

    pub async fn create(&self, input: &TransactionInput) -> AppResult<Transaction> {
        let draft = input.to_draft()?;

        let mut tx = self.pool.begin().await?;
        ensure_month_open(&mut tx, YearMonth::of(draft.transaction_date)).await?;
        let id = insert_transaction(&mut tx, &draft).await?;
        tx.commit().await?;

        info!(
            transaction_id = id,
            kind = %draft.transaction_type,
            category = %draft.category,
            amount = draft.amount,
            "거래 등록"
        );
        self.get(id).await
    }

    /// 청구와 연결된 거래는 청구 입금 취소로만 변경할 수 있습니다.
    pub async fn update(&self, id: i64, input: &TransactionInput) -> AppResult<Transaction> {
        let draft = input.to_draft()?;

        let mut tx = self.pool.begin().await?;
        let existing = fetch_transaction(&mut tx, id).await?;
        if existing.billing_id.is_some() {
            return Err(AppError::InvalidState(
                "청구와 연결된 거래는 수정할 수 없습니다. 입금 확인을 취소하세요".to_string(),
            ));
        }
        ensure_month_open(&mut tx, YearMonth::of(existing.transaction_date)).await?;
        ensure_month_open(&mut tx, YearMonth::of(draft.transaction_date)).await?;

        sqlx::query(
            "UPDATE transactions SET transaction_date = ?, transaction_type = ?, category = ?, amount = ?, \
             supply_amount = ?, vat = ?, description = ?, payment_method = ?, contract_id = ?, tenant_id = ? \
             WHERE id = ?",
        )
        .bind(draft.transaction_date)
        .bind(draft.transaction_type.as_str())
        .bind(draft.category.as_str())
        .bind(draft.amount)
        .bind(draft.supply_amount)
        .bind(draft.vat)
        .bind(&draft.description)
        .bind(&draft.payment_method)
        .bind(draft.contract_id)
        .bind(draft.tenant_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let existing = fetch_transaction(&mut tx, id).await?;
        if existing.billing_id.is_some() {
            return Err(AppError::InvalidState(
                "청구와 연결된 거래는 삭제할 수 없습니다. 입금 확인을 취소하세요".to_string(),
            ));
        }
        ensure_month_open(&mut tx, YearMonth::of(existing.transaction_date)).await?;

        sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(transaction_id = id, "거래 삭제");
        Ok(())
    }
}

pub(crate) async fn fetch_transaction(conn: &mut MySqlConnection, id: i64) -> AppResult<Transaction> {
    let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
    sqlx::query_as::<_, Transaction>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("거래".to_string()))
}

/// 거래 저장 후 ID 반환 (호출하는 쪽 트랜잭션 안에서 실행)
pub(crate) async fn insert_transaction(
    conn: &mut MySqlConnection,
    draft: &TransactionDraft,
) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO transactions (transaction_date, transaction_type, category, amount, supply_amount, vat, \
         description, payment_method, contract_id, tenant_id, billing_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(draft.transaction_date)
    .bind(draft.transaction_type.as_str())
    .bind(draft.category.as_str())
    .bind(draft.amount)
    .bind(draft.supply_amount)
    .bind(draft.vat)
    .bind(&draft.description)
    .bind(&draft.payment_method)
    .bind(draft.contract_id)
    .bind(draft.tenant_id)
    .bind(draft.billing_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_id() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: i64, vat_included: bool) -> TransactionInput {
        TransactionInput {
            transaction_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            transaction_type: TransactionType::Expense,
            category: TransactionCategory::Repair,
            amount,
            vat_included,
            description: Some(" 에어컨 수리 ".to_string()),
            payment_method: Some(String::new()),
            contract_id: None,
            tenant_id: None,
        }
    }

    #[test]
    fn test_draft_splits_vat() {
        let draft = input(110_000, true).to_draft().unwrap();
        assert_eq!(draft.vat, 10_000);
        assert_eq!(draft.supply_amount, 100_000);
        assert_eq!(draft.description.as_deref(), Some("에어컨 수리"));
        assert_eq!(draft.payment_method, None);
    }

    #[test]
    fn test_draft_without_vat() {
        let draft = input(110_000, false).to_draft().unwrap();
        assert_eq!(draft.vat, 0);
        assert_eq!(draft.supply_amount, 110_000);
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(matches!(input(0, true).to_draft(), Err(AppError::InvalidInput(_))));
        assert!(input(-100, true).to_draft().is_err());
    }

    #[test]
    fn test_income_draft() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let draft = TransactionDraft::income(date, TransactionCategory::Penalty, 1_000_000, "위약금".into());
        assert_eq!(draft.transaction_type, TransactionType::Income);
        assert_eq!(draft.vat, 90_909);
        assert_eq!(draft.supply_amount, 909_091);
    }

    #[test]
    fn test_vat_included_defaults_to_true() {
        let parsed: TransactionInput = serde_json::from_str(
            r#"{"transaction_date":"2024-05-01","transaction_type":"수입","category":"기타","amount":11000}"#,
        )
        .unwrap();
        assert!(parsed.vat_included);
    }
}
