//! 계약 모델

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

string_enum! {
    /// 계약 상태
    ContractStatus("계약 상태") {
        Active => "진행중",
        EarlyTerminated => "중도종료",
        Expired => "만기종료",
    }
}

string_enum! {
    /// 계약 종료 유형
    TerminationType("계약 종료 유형") {
        /// 중도종료 - 보증금은 위약금 수입으로 전환
        Early => "중도종료",
        /// 만기종료 - 보증금은 마지막 달 사용료로 전환
        Expiry => "만기종료",
    }
}

impl TerminationType {
    /// 종료 후 계약 상태
    pub fn resulting_status(&self) -> ContractStatus {
        match self {
            TerminationType::Early => ContractStatus::EarlyTerminated,
            TerminationType::Expiry => ContractStatus::Expired,
        }
    }
}

string_enum! {
    /// 보증금 처리 상태
    DepositStatus("보증금 상태") {
        Held => "보관중",
        ConvertedToPenalty => "위약금전환",
        ConvertedToUsageFee => "사용료전환",
        Returned => "반환",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contract {
    pub id: i64,
    pub contract_number: String,
    pub room_id: i64,
    pub tenant_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: i64,
    pub deposit: i64,
    pub management_fee: i64,
    /// 렌트프리 기간 (양 끝 포함)
    pub rent_free_start: Option<NaiveDate>,
    pub rent_free_end: Option<NaiveDate>,
    /// 납부일 (1~31, 말일 초과 시 말일)
    pub payment_day: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: ContractStatus,
    #[sqlx(try_from = "String")]
    pub deposit_status: DepositStatus,
    pub termination_date: Option<NaiveDate>,
    pub termination_memo: Option<String>,
    pub is_active: bool,
    pub signed_at: Option<DateTime<Utc>>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// 월 청구액 (임대료 + 관리비)
    pub fn monthly_total(&self) -> i64 {
        self.monthly_rent + self.management_fee
    }

    pub fn is_in_progress(&self) -> bool {
        self.is_active && self.status == ContractStatus::Active
    }
}

/// 호실 번호와 입주사명을 함께 조회한 계약
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContractDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contract: Contract,
    pub room_number: String,
    pub company_name: String,
}
