//! 월별 청구 서비스
//!
//! 청구 생성, 입금 확인(수입 거래 생성), 입금 취소, 청구 삭제

use crate::domain::billing_rules::{self, BillingDecision};
use crate::service::settlement_service::ensure_month_open;
use crate::service::transaction_service::{insert_transaction, TransactionDraft};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::config::DbConnection;
use shared::model::{BillingDetail, BillingStatus, Contract, TransactionCategory};
use shared::security::validation::{normalize_optional, require_positive};
use shared::tool::error::{AppError, AppResult};
use shared::tool::YearMonth;
use sqlx::MySqlConnection;
use std::collections::HashSet;
use tracing::info;

const BILLING_DETAIL_SELECT: &str = "SELECT b.*, r.room_number, t.company_name \
     FROM monthly_billings b JOIN rooms r ON r.id = b.room_id JOIN tenants t ON t.id = b.tenant_id";

#[derive(Debug, Default, Deserialize)]
pub struct BillingFilter {
    pub month: Option<YearMonth>,
    pub status: Option<BillingStatus>,
    pub contract_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub billing_month: YearMonth,
}

/// 청구 생성 결과
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub billing_month: Option<YearMonth>,
    pub created: usize,
    pub skipped_rent_free: usize,
    pub skipped_existing: usize,
    pub billing_ids: Vec<i64>,
}

/// 입금 확인 입력 (생략 시 청구액 전액, 오늘 날짜)
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmPayment {
    pub paid_amount: Option<i64>,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub memo: Option<String>,
}

#[derive(Clone)]
pub struct BillingService {
    pool: DbConnection,
}

impl BillingService {
    pub fn new(pool: DbConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &BillingFilter) -> AppResult<Vec<BillingDetail>> {
        let sql = format!(
            "{} WHERE (? IS NULL OR b.billing_month = ?) \
               AND (? IS NULL OR b.status = ?) \
               AND (? IS NULL OR b.contract_id = ?) \
             ORDER BY b.billing_month DESC, r.room_number",
            BILLING_DETAIL_SELECT
        );
        let month = filter.month.map(|m| m.to_string());
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, BillingDetail>(&sql)
            .bind(&month)
            .bind(&month)
            .bind(status)
            .bind(status)
            .bind(filter.contract_id)
            .bind(filter.contract_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> AppResult<BillingDetail> {
        let mut conn = self.pool.acquire().await?;
        fetch_billing(&mut conn, id, false).await
    }

    /// 진행중 계약의 해당 월 청구를 만듭니다.
    ///
    /// 렌트프리 기간이 그 달 15일을 포함하는 계약과 이미 청구된 계약은 건너뜁니다.
    pub async fn generate(&self, month: YearMonth) -> AppResult<GenerationSummary> {
        let mut tx = self.pool.begin().await?;

        let contracts = sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts \
             WHERE status = '진행중' AND is_active = TRUE AND start_date <= ? AND end_date >= ? \
             ORDER BY id",
        )
        .bind(month.last_day())
        .bind(month.first_day())
        .fetch_all(&mut *tx)
        .await?;

        let existing: HashSet<i64> = sqlx::query_scalar::<_, i64>(
            "SELECT contract_id FROM monthly_billings WHERE billing_month = ?",
        )
        .bind(month.to_string())
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let mut summary = GenerationSummary {
            billing_month: Some(month),
            ..Default::default()
        };

        for contract in &contracts {
            if existing.contains(&contract.id) {
                summary.skipped_existing += 1;
                continue;
            }

            match billing_rules::decide(contract, month) {
                BillingDecision::SkipRentFree => {
                    summary.skipped_rent_free += 1;
                }
                BillingDecision::OutOfTerm => {}
                BillingDecision::Bill => {
                    let due_date =
                        billing_rules::due_date(month, contract.payment_day, contract.start_date);
                    let result = sqlx::query(
                        "INSERT INTO monthly_billings (contract_id, tenant_id, room_id, billing_month, rent_amount, management_fee, total_amount, due_date, status) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, '미납')",
                    )
                    .bind(contract.id)
                    .bind(contract.tenant_id)
                    .bind(contract.room_id)
                    .bind(month.to_string())
                    .bind(contract.monthly_rent)
                    .bind(contract.management_fee)
                    .bind(contract.monthly_total())
                    .bind(due_date)
                    .execute(&mut *tx)
                    .await?;

                    summary.created += 1;
                    summary.billing_ids.push(result.last_insert_id() as i64);
                }
            }
        }

        tx.commit().await?;

        info!(
            month = %month,
            created = summary.created,
            skipped_rent_free = summary.skipped_rent_free,
            skipped_existing = summary.skipped_existing,
            "월별 청구 생성"
        );
        Ok(summary)
    }

    /// 입금 확인 - 임대료 수입 거래를 만들고 청구를 납부완료로 바꿉니다.
    pub async fn confirm(&self, id: i64, payment: ConfirmPayment) -> AppResult<BillingDetail> {
        let mut tx = self.pool.begin().await?;

        let detail = fetch_billing(&mut tx, id, true).await?;
        let billing = &detail.billing;
        if billing.status != BillingStatus::Unpaid {
            return Err(AppError::InvalidState("이미 입금 확인된 청구입니다".to_string()));
        }

        let paid_amount = payment.paid_amount.unwrap_or(billing.total_amount);
        require_positive("입금액", paid_amount)?;
        let paid_date = payment
            .paid_date
            .unwrap_or_else(|| Local::now().date_naive());
        ensure_month_open(&mut tx, YearMonth::of(paid_date)).await?;

        let description = billing_rules::payment_description(
            billing.billing_month,
            &detail.company_name,
            &detail.room_number,
            billing.total_amount,
            paid_amount,
        );
        let mut draft =
            TransactionDraft::income(paid_date, TransactionCategory::Rent, paid_amount, description);
        draft.payment_method = normalize_optional(payment.payment_method);
        draft.contract_id = Some(billing.contract_id);
        draft.tenant_id = Some(billing.tenant_id);
        draft.billing_id = Some(billing.id);
        let transaction_id = insert_transaction(&mut tx, &draft).await?;

        sqlx::query(
            "UPDATE monthly_billings SET status = '납부완료', transaction_id = ?, paid_amount = ?, paid_date = ?, \
             memo = COALESCE(?, memo) WHERE id = ?",
        )
        .bind(transaction_id)
        .bind(paid_amount)
        .bind(paid_date)
        .bind(normalize_optional(payment.memo))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            billing_id = id,
            transaction_id,
            billed = billing.total_amount,
            paid = paid_amount,
            "청구 입금 확인"
        );
        self.get(id).await
    }

    /// 입금 확인 취소 - 연결된 거래를 지우고 미납으로 되돌립니다.
    pub async fn cancel(&self, id: i64) -> AppResult<BillingDetail> {
        let mut tx = self.pool.begin().await?;

        let detail = fetch_billing(&mut tx, id, true).await?;
        if detail.billing.status != BillingStatus::Paid {
            return Err(AppError::InvalidState("입금 확인된 청구가 아닙니다".to_string()));
        }

        if let Some(transaction_id) = detail.billing.transaction_id {
            let transaction_date: Option<NaiveDate> =
                sqlx::query_scalar("SELECT transaction_date FROM transactions WHERE id = ?")
                    .bind(transaction_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if let Some(date) = transaction_date.or(detail.billing.paid_date) {
                ensure_month_open(&mut tx, YearMonth::of(date)).await?;
            }

            sqlx::query("DELETE FROM transactions WHERE id = ?")
                .bind(transaction_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "UPDATE monthly_billings SET status = '미납', transaction_id = NULL, paid_amount = NULL, paid_date = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(billing_id = id, "청구 입금 확인 취소");
        self.get(id).await
    }

    /// 미납 청구만 삭제할 수 있습니다.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let detail = self.get(id).await?;
        if detail.billing.status != BillingStatus::Unpaid {
            return Err(AppError::InvalidState(
                "입금 확인된 청구는 삭제할 수 없습니다. 먼저 입금 확인을 취소하세요".to_string(),
            ));
        }

        sqlx::query("DELETE FROM monthly_billings WHERE id = ? AND status = '미납'")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!(billing_id = id, "청구 삭제");
        Ok(())
    }
}

pub(crate) async fn fetch_billing(
    conn: &mut MySqlConnection,
    id: i64,
    for_update: bool,
) -> AppResult<BillingDetail> {
    let sql = format!(
        "{} WHERE b.id = ?{}",
        BILLING_DETAIL_SELECT,
        if for_update { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, BillingDetail>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("청구".to_string()))
}
