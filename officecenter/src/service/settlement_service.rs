//! 월별 정산 서비스
//!
//! 확정 전에는 실시간으로 집계하고, 확정 시점의 보고서는 스냅샷(JSON)으로 보관합니다.

use crate::domain::settlement_report::{
    BillingSummary, RoomCount, SettlementReport, TransactionAggregate,
};
use chrono::Utc;
use shared::config::DbConnection;
use shared::model::Settlement;
use shared::tool::error::{AppError, AppResult};
use shared::tool::YearMonth;
use sqlx::MySqlConnection;
use tracing::info;

const SETTLEMENT_COLUMNS: &str = "id, settlement_month, total_income, total_expense, net_profit, \
     occupancy_rate, snapshot, confirmed_by, confirmed_at";

/// 정산이 확정된 월이면 `SettlementLocked`
pub(crate) async fn ensure_month_open(conn: &mut MySqlConnection, month: YearMonth) -> AppResult<()> {
    let confirmed: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM settlements WHERE settlement_month = ?")
            .bind(month.to_string())
            .fetch_one(&mut *conn)
            .await?;

    if confirmed > 0 {
        return Err(AppError::SettlementLocked(format!(
            "{} 정산이 확정되어 거래를 변경할 수 없습니다",
            month
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SettlementService {
    pool: DbConnection,
}

impl SettlementService {
    pub fn new(pool: DbConnection) -> Self {
        Self { pool }
    }

    /// 확정된 월은 스냅샷, 아니면 실시간 집계
    pub async fn report(&self, month: YearMonth) -> AppResult<SettlementReport> {
        if let Some(settlement) = self.find(month).await? {
            return snapshot_of(&settlement);
        }
        let mut conn = self.pool.acquire().await?;
        build_report(&mut conn, month).await
    }

    pub async fn find(&self, month: YearMonth) -> AppResult<Option<Settlement>> {
        let sql = format!(
            "SELECT {} FROM settlements WHERE settlement_month = ?",
            SETTLEMENT_COLUMNS
        );
        let settlement = sqlx::query_as::<_, Settlement>(&sql)
            .bind(month.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(settlement)
    }

    /// 정산 확정. 이후 해당 월의 거래 변경은 거부됩니다.
    pub async fn confirm(&self, month: YearMonth, admin_id: i64) -> AppResult<SettlementReport> {
        if month > YearMonth::current() {
            return Err(AppError::InvalidInput(format!(
                "아직 지나지 않은 월은 확정할 수 없습니다: {}",
                month
            )));
        }

        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM settlements WHERE settlement_month = ? FOR UPDATE",
        )
        .bind(month.to_string())
        .fetch_one(&mut *tx)
        .await?;
        if existing > 0 {
            return Err(AppError::InvalidState(format!("이미 확정된 정산입니다: {}", month)));
        }

        let report = build_report(&mut tx, month).await?.confirm(Utc::now());
        let snapshot = serde_json::to_string(&report)
            .map_err(|e| AppError::InternalError(format!("정산 스냅샷 직렬화 실패: {}", e)))?;

        sqlx::query(
            "INSERT INTO settlements (settlement_month, total_income, total_expense, net_profit, occupancy_rate, snapshot, confirmed_by, confirmed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(month.to_string())
        .bind(report.total_income)
        .bind(report.total_expense)
        .bind(report.net_profit)
        .bind(report.rooms.occupancy_rate)
        .bind(&snapshot)
        .bind(admin_id)
        .bind(report.confirmed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::DuplicateEntry(_) => {
                AppError::InvalidState(format!("이미 확정된 정산입니다: {}", month))
            }
            other => other,
        })?;

        tx.commit().await?;

        info!(
            month = %month,
            admin_id,
            net_profit = report.net_profit,
            occupancy_rate = report.rooms.occupancy_rate,
            "월별 정산 확정"
        );
        Ok(report)
    }

    /// 연도별 확정 정산 목록
    pub async fn list(&self, year: Option<i32>) -> AppResult<Vec<Settlement>> {
        let sql = format!(
            "SELECT {} FROM settlements WHERE (? IS NULL OR settlement_month LIKE ?) ORDER BY settlement_month DESC",
            SETTLEMENT_COLUMNS
        );
        let pattern = year.map(|y| format!("{:04}-%", y));
        let rows = sqlx::query_as::<_, Settlement>(&sql)
            .bind(year)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

fn snapshot_of(settlement: &Settlement) -> AppResult<SettlementReport> {
    serde_json::from_str(&settlement.snapshot).map_err(|e| {
        AppError::InternalError(format!(
            "{} 정산 스냅샷을 읽을 수 없습니다: {}",
            settlement.settlement_month, e
        ))
    })
}

/// 해당 월의 거래/청구/호실/계약 집계
pub(crate) async fn build_report(
    conn: &mut MySqlConnection,
    month: YearMonth,
) -> AppResult<SettlementReport> {
    let first = month.first_day();
    let last = month.last_day();

    let totals: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT transaction_type, category, CAST(COALESCE(SUM(amount), 0) AS SIGNED) \
         FROM transactions WHERE transaction_date BETWEEN ? AND ? \
         GROUP BY transaction_type, category",
    )
    .bind(first)
    .bind(last)
    .fetch_all(&mut *conn)
    .await?;
    let totals = totals
        .into_iter()
        .map(|(kind, category, total)| -> AppResult<TransactionAggregate> {
            Ok(TransactionAggregate {
                transaction_type: kind.parse()?,
                category: category.parse()?,
                total,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let (billing_count, billed_total, collected_total, outstanding_total, unpaid_count): (
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        "SELECT COUNT(*), \
                CAST(COALESCE(SUM(total_amount), 0) AS SIGNED), \
                CAST(COALESCE(SUM(CASE WHEN status = '납부완료' THEN COALESCE(paid_amount, total_amount) ELSE 0 END), 0) AS SIGNED), \
                CAST(COALESCE(SUM(CASE WHEN status = '미납' THEN total_amount ELSE 0 END), 0) AS SIGNED), \
                CAST(COALESCE(SUM(CASE WHEN status = '미납' THEN 1 ELSE 0 END), 0) AS SIGNED) \
         FROM monthly_billings WHERE billing_month = ?",
    )
    .bind(month.to_string())
    .fetch_one(&mut *conn)
    .await?;

    let rooms = room_counts(conn).await?;

    let (contracts_started, contracts_ended): (i64, i64) = sqlx::query_as(
        "SELECT CAST(COALESCE(SUM(CASE WHEN start_date BETWEEN ? AND ? THEN 1 ELSE 0 END), 0) AS SIGNED), \
                CAST(COALESCE(SUM(CASE WHEN COALESCE(termination_date, end_date) BETWEEN ? AND ? THEN 1 ELSE 0 END), 0) AS SIGNED) \
         FROM contracts WHERE is_active = TRUE",
    )
    .bind(first)
    .bind(last)
    .bind(first)
    .bind(last)
    .fetch_one(&mut *conn)
    .await?;

    Ok(SettlementReport::assemble(
        month,
        &totals,
        BillingSummary {
            billing_count,
            billed_total,
            collected_total,
            outstanding_total,
            unpaid_count,
        },
        &rooms,
        contracts_started,
        contracts_ended,
    ))
}

/// 유형/상태별 호실 수
pub(crate) async fn room_counts(conn: &mut MySqlConnection) -> AppResult<Vec<RoomCount>> {
    let rows: Vec<(String, String, i64)> =
        sqlx::query_as("SELECT room_type, status, COUNT(*) FROM rooms GROUP BY room_type, status")
            .fetch_all(&mut *conn)
            .await?;

    rows.into_iter()
        .map(|(room_type, status, count)| -> AppResult<RoomCount> {
            Ok(RoomCount {
                room_type: room_type.parse()?,
                status: status.parse()?,
                count,
            })
        })
        .collect()
}
