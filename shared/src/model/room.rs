//! 호실 모델

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

string_enum! {
    /// 호실 유형
    RoomType("호실 유형") {
        Single => "1인실",
        Double => "2인실",
        SixPerson => "6인실",
        MeetingRoom => "회의실",
        OpenDesk => "오픈데스크",
        /// 우편물 수취 전용
        PostBox => "POST BOX",
    }
}

impl RoomType {
    /// 입주율 계산에 포함되는 임대용 호실인지
    pub fn is_leasable(&self) -> bool {
        !matches!(self, RoomType::MeetingRoom | RoomType::PostBox)
    }
}

string_enum! {
    /// 호실 상태
    RoomStatus("호실 상태") {
        Vacant => "공실",
        Occupied => "입주",
        ContractEnded => "계약종료",
        Reserved => "예약",
        Maintenance => "정비중",
    }
}

impl RoomStatus {
    /// 새 계약을 받을 수 있는 상태
    pub fn accepts_new_contract(&self) -> bool {
        matches!(
            self,
            RoomStatus::Vacant | RoomStatus::ContractEnded | RoomStatus::Reserved
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Room {
    pub id: i64,
    pub room_number: String,
    pub floor: Option<i32>,
    #[sqlx(try_from = "String")]
    pub room_type: RoomType,
    pub area: Option<f64>,
    pub monthly_rent: i64,
    pub deposit: i64,
    pub management_fee: i64,
    #[sqlx(try_from = "String")]
    pub status: RoomStatus,
    pub current_tenant_id: Option<i64>,
    pub current_company_name: Option<String>,
    pub last_company_name: Option<String>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
