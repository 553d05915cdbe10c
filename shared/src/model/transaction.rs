//! 거래(수입/지출) 모델

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

string_enum! {
    /// 거래 구분
    TransactionType("거래 구분") {
        Income => "수입",
        Expense => "지출",
    }
}

string_enum! {
    /// 거래 항목
    TransactionCategory("거래 항목") {
        Rent => "임대료",
        ManagementFee => "관리비",
        Deposit => "보증금",
        /// 중도종료 시 보증금 전환
        Penalty => "위약금",
        /// 만기종료 시 마지막 달 사용료로 보증금 전환
        UsageFee => "사용료",
        Utilities => "공과금",
        Repair => "수리비",
        Other => "기타",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub transaction_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub transaction_type: TransactionType,
    #[sqlx(try_from = "String")]
    pub category: TransactionCategory,
    /// 부가세 포함 금액
    pub amount: i64,
    pub supply_amount: i64,
    pub vat: i64,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub contract_id: Option<i64>,
    pub tenant_id: Option<i64>,
    pub billing_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
