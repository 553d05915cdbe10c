//! 월별 청구 모델

use crate::tool::month::YearMonth;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

string_enum! {
    /// 청구 상태
    BillingStatus("청구 상태") {
        Unpaid => "미납",
        Paid => "납부완료",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlyBilling {
    pub id: i64,
    pub contract_id: i64,
    pub tenant_id: i64,
    pub room_id: i64,
    #[sqlx(try_from = "String")]
    pub billing_month: YearMonth,
    pub rent_amount: i64,
    pub management_fee: i64,
    pub total_amount: i64,
    pub due_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: BillingStatus,
    /// 입금 확인 시 생성된 거래
    pub transaction_id: Option<i64>,
    pub paid_amount: Option<i64>,
    pub paid_date: Option<NaiveDate>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 호실 번호와 입주사명을 함께 조회한 청구
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BillingDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub billing: MonthlyBilling,
    pub room_number: String,
    pub company_name: String,
}
