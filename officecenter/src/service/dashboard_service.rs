//! 대시보드 요약

use crate::domain::settlement_report::{summarize_rooms, RoomSummary};
use crate::service::contract_service::ContractService;
use crate::service::settlement_service::room_counts;
use chrono::{Duration, Local};
use serde::Serialize;
use shared::config::DbConnection;
use shared::model::ContractDetail;
use shared::tool::error::AppResult;
use shared::tool::YearMonth;

const EXPIRING_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub month: YearMonth,
    pub rooms: RoomSummary,
    pub unpaid_count: i64,
    pub unpaid_amount: i64,
    pub expiring_contracts: Vec<ContractDetail>,
    pub month_income: i64,
    pub month_expense: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    pool: DbConnection,
    contracts: ContractService,
}

impl DashboardService {
    pub fn new(pool: DbConnection) -> Self {
        Self {
            contracts: ContractService::new(pool.clone()),
            pool,
        }
    }

    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        let today = Local::now().date_naive();
        let month = YearMonth::current();

        let mut conn = self.pool.acquire().await?;
        let rooms = summarize_rooms(&room_counts(&mut conn).await?);

        let (unpaid_count, unpaid_amount): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), CAST(COALESCE(SUM(total_amount), 0) AS SIGNED) \
             FROM monthly_billings WHERE billing_month = ? AND status = '미납'",
        )
        .bind(month.to_string())
        .fetch_one(&mut *conn)
        .await?;

        let (month_income, month_expense): (i64, i64) = sqlx::query_as(
            "SELECT CAST(COALESCE(SUM(CASE WHEN transaction_type = '수입' THEN amount ELSE 0 END), 0) AS SIGNED), \
                    CAST(COALESCE(SUM(CASE WHEN transaction_type = '지출' THEN amount ELSE 0 END), 0) AS SIGNED) \
             FROM transactions WHERE transaction_date BETWEEN ? AND ?",
        )
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_one(&mut *conn)
        .await?;
        drop(conn);

        let expiring_contracts = self
            .contracts
            .expiring_between(today, today + Duration::days(EXPIRING_WINDOW_DAYS))
            .await?;

        Ok(DashboardSummary {
            month,
            rooms,
            unpaid_count,
            unpaid_amount,
            expiring_contracts,
            month_income,
            month_expense,
        })
    }
}
