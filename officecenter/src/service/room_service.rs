//! 호실 서비스

use crate::domain::room_status::{self, Occupant, OccupantFields};
use serde::{Deserialize, Serialize};
use shared::config::DbConnection;
use shared::model::{ContractDetail, Room, RoomStatus, RoomType};
use shared::security::validation::{normalize_optional, require_non_negative, require_text};
use shared::tool::error::{AppError, AppResult};
use sqlx::MySqlConnection;
use tracing::info;

const ROOM_COLUMNS: &str = "id, room_number, floor, room_type, area, monthly_rent, deposit, \
     management_fee, status, current_tenant_id, current_company_name, last_company_name, \
     memo, created_at, updated_at";

#[derive(Debug, Default, Deserialize)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
    pub room_type: Option<RoomType>,
    pub floor: Option<i32>,
}

/// 호실 등록/수정 입력 (상태는 별도 API로 변경)
#[derive(Debug, Clone, Deserialize)]
pub struct RoomInput {
    pub room_number: String,
    pub floor: Option<i32>,
    pub room_type: RoomType,
    pub area: Option<f64>,
    #[serde(default)]
    pub monthly_rent: i64,
    #[serde(default)]
    pub deposit: i64,
    #[serde(default)]
    pub management_fee: i64,
    pub memo: Option<String>,
}

impl RoomInput {
    pub fn validate(&self) -> AppResult<()> {
        require_text("room_number", &self.room_number)?;
        require_non_negative("월 임대료", self.monthly_rent)?;
        require_non_negative("보증금", self.deposit)?;
        require_non_negative("관리비", self.management_fee)?;
        if let Some(area) = self.area {
            if area < 0.0 {
                return Err(AppError::InvalidInput("면적은 0 이상이어야 합니다".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomStatusChange {
    pub status: RoomStatus,
    pub tenant_id: Option<i64>,
    pub company_name: Option<String>,
}

/// 진행중 계약을 포함한 호실 상세
#[derive(Debug, Serialize)]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub active_contract: Option<ContractDetail>,
}

#[derive(Clone)]
pub struct RoomService {
    pool: DbConnection,
}

impl RoomService {
    pub fn new(pool: DbConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &RoomFilter) -> AppResult<Vec<Room>> {
        let sql = format!(
            "SELECT {} FROM rooms \
             WHERE (? IS NULL OR status = ?) \
               AND (? IS NULL OR room_type = ?) \
               AND (? IS NULL OR floor = ?) \
             ORDER BY floor, room_number",
            ROOM_COLUMNS
        );
        let status = filter.status.map(|s| s.as_str());
        let room_type = filter.room_type.map(|t| t.as_str());

        let rooms = sqlx::query_as::<_, Room>(&sql)
            .bind(status)
            .bind(status)
            .bind(room_type)
            .bind(room_type)
            .bind(filter.floor)
            .bind(filter.floor)
            .fetch_all(&self.pool)
            .await?;
        Ok(rooms)
    }

    pub async fn get(&self, id: i64) -> AppResult<Room> {
        let mut conn = self.pool.acquire().await?;
        fetch_room(&mut conn, id, false).await
    }

    pub async fn get_detail(&self, id: i64) -> AppResult<RoomDetail> {
        let room = self.get(id).await?;
        let active_contract = sqlx::query_as::<_, ContractDetail>(
            "SELECT c.*, r.room_number, t.company_name FROM contracts c \
             JOIN rooms r ON r.id = c.room_id JOIN tenants t ON t.id = c.tenant_id \
             WHERE c.room_id = ? AND c.status = '진행중' AND c.is_active = TRUE \
             ORDER BY c.start_date DESC LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(RoomDetail {
            room,
            active_contract,
        })
    }

    pub async fn create(&self, input: &RoomInput) -> AppResult<Room> {
        input.validate()?;

        let result = sqlx::query(
            "INSERT INTO rooms (room_number, floor, room_type, area, monthly_rent, deposit, management_fee, status, memo) \
             VALUES (?, ?, ?, ?, ?, ?, ?, '공실', ?)",
        )
        .bind(input.room_number.trim())
        .bind(input.floor)
        .bind(input.room_type.as_str())
        .bind(input.area)
        .bind(input.monthly_rent)
        .bind(input.deposit)
        .bind(input.management_fee)
        .bind(normalize_optional(input.memo.clone()))
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_room_number(e, &input.room_number))?;

        let id = result.last_insert_id() as i64;
        info!(room_id = id, room_number = %input.room_number, "호실 등록");
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: &RoomInput) -> AppResult<Room> {
        input.validate()?;
        self.get(id).await?;

        sqlx::query(
            "UPDATE rooms SET room_number = ?, floor = ?, room_type = ?, area = ?, monthly_rent = ?, \
             deposit = ?, management_fee = ?, memo = ? WHERE id = ?",
        )
        .bind(input.room_number.trim())
        .bind(input.floor)
        .bind(input.room_type.as_str())
        .bind(input.area)
        .bind(input.monthly_rent)
        .bind(input.deposit)
        .bind(input.management_fee)
        .bind(normalize_optional(input.memo.clone()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_room_number(e, &input.room_number))?;

        self.get(id).await
    }

    /// 계약 이력이 있는 호실은 삭제할 수 없습니다.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.get(id).await?;

        let (active, total): (i64, i64) = sqlx::query_as(
            "SELECT CAST(COALESCE(SUM(CASE WHEN status = '진행중' AND is_active = TRUE THEN 1 ELSE 0 END), 0) AS SIGNED), \
                    COUNT(*) \
             FROM contracts WHERE room_id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if active > 0 {
            return Err(AppError::InvalidState(
                "진행중인 계약이 있는 호실은 삭제할 수 없습니다".to_string(),
            ));
        }
        if total > 0 {
            return Err(AppError::InvalidState(
                "계약 이력이 있는 호실은 삭제할 수 없습니다".to_string(),
            ));
        }

        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!(room_id = id, "호실 삭제");
        Ok(())
    }

    pub async fn change_status(&self, id: i64, change: RoomStatusChange) -> AppResult<Room> {
        let mut tx = self.pool.begin().await?;

        let room = fetch_room(&mut tx, id, true).await?;

        let mut company_name = normalize_optional(change.company_name);
        if let Some(tenant_id) = change.tenant_id {
            let tenant_company: Option<String> =
                sqlx::query_scalar("SELECT company_name FROM tenants WHERE id = ?")
                    .bind(tenant_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let tenant_company =
                tenant_company.ok_or_else(|| AppError::NotFound("입주사".to_string()))?;
            company_name = company_name.or(Some(tenant_company));
        }

        let next = room_status::transition(
            &occupant_fields(&room),
            change.status,
            Occupant {
                tenant_id: change.tenant_id,
                company_name,
            },
        )?;
        apply_room_state(&mut tx, id, change.status, &next).await?;

        tx.commit().await?;

        info!(
            room_id = id,
            from = %room.status,
            to = %change.status,
            "호실 상태 변경"
        );
        self.get(id).await
    }
}

fn duplicate_room_number(error: sqlx::Error, room_number: &str) -> AppError {
    match AppError::from(error) {
        AppError::DuplicateEntry(_) => {
            AppError::DuplicateEntry(format!("이미 등록된 호실 번호: {}", room_number.trim()))
        }
        other => other,
    }
}

pub(crate) fn occupant_fields(room: &Room) -> OccupantFields {
    OccupantFields {
        current_tenant_id: room.current_tenant_id,
        current_company_name: room.current_company_name.clone(),
        last_company_name: room.last_company_name.clone(),
    }
}

/// 호실 조회 (`for_update`이면 행 잠금)
pub(crate) async fn fetch_room(
    conn: &mut MySqlConnection,
    id: i64,
    for_update: bool,
) -> AppResult<Room> {
    let sql = format!(
        "SELECT {} FROM rooms WHERE id = ?{}",
        ROOM_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, Room>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("호실".to_string()))
}

/// 상태 전이 결과를 저장합니다.
pub(crate) async fn apply_room_state(
    conn: &mut MySqlConnection,
    id: i64,
    status: RoomStatus,
    fields: &OccupantFields,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE rooms SET status = ?, current_tenant_id = ?, current_company_name = ?, last_company_name = ? WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(fields.current_tenant_id)
    .bind(&fields.current_company_name)
    .bind(&fields.last_company_name)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// 호실 상태를 전이 규칙에 따라 변경합니다. (계약 생성/종료/삭제에서 사용)
pub(crate) async fn transition_room(
    conn: &mut MySqlConnection,
    room: &Room,
    status: RoomStatus,
    occupant: Occupant,
) -> AppResult<()> {
    let next = room_status::transition(&occupant_fields(room), status, occupant)?;
    apply_room_state(conn, room.id, status, &next).await
}
