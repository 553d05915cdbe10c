//! 월별 정산 모델

use crate::tool::month::YearMonth;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// 확정된 월별 정산. `snapshot`은 확정 시점의 정산 보고서(JSON)입니다.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Settlement {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub settlement_month: YearMonth,
    pub total_income: i64,
    pub total_expense: i64,
    pub net_profit: i64,
    pub occupancy_rate: f64,
    #[serde(skip_serializing)]
    pub snapshot: String,
    pub confirmed_by: Option<i64>,
    pub confirmed_at: DateTime<Utc>,
}
