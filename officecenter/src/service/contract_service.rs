//! 계약 서비스
//!
//! 계약 생성(호실 입주 처리), 조건 변경, 종료(보증금 전환), 소프트/하드 삭제

use crate::domain::contract_rules::{self, ContractTerms};
use crate::domain::deposit;
use crate::domain::room_status::Occupant;
use crate::service::room_service::{fetch_room, transition_room};
use crate::service::settlement_service::ensure_month_open;
use crate::service::tenant_service::fetch_tenant;
use crate::service::transaction_service::{fetch_transaction, insert_transaction, TransactionDraft};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::config::DbConnection;
use shared::model::{
    ContractDetail, ContractStatus, RoomStatus, TerminationType, Transaction,
};
use shared::security::validation::normalize_optional;
use shared::tool::error::{AppError, AppResult};
use shared::tool::YearMonth;
use sqlx::MySqlConnection;
use tracing::info;

const CONTRACT_DETAIL_SELECT: &str = "SELECT c.*, r.room_number, t.company_name \
     FROM contracts c JOIN rooms r ON r.id = c.room_id JOIN tenants t ON t.id = c.tenant_id";

const DEFAULT_EXPIRING_DAYS: i64 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct ContractFilter {
    pub status: Option<ContractStatus>,
    pub room_id: Option<i64>,
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// 계약 생성 입력. 금액을 생략하면 호실 기본값을 사용합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContract {
    pub room_id: i64,
    pub tenant_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Option<i64>,
    pub deposit: Option<i64>,
    pub management_fee: Option<i64>,
    pub rent_free_start: Option<NaiveDate>,
    pub rent_free_end: Option<NaiveDate>,
    pub payment_day: Option<i32>,
    pub memo: Option<String>,
}

/// 진행중 계약의 조건 변경 (생략한 항목은 유지)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractUpdate {
    pub monthly_rent: Option<i64>,
    pub management_fee: Option<i64>,
    pub end_date: Option<NaiveDate>,
    pub rent_free_start: Option<NaiveDate>,
    pub rent_free_end: Option<NaiveDate>,
    /// 렌트프리 기간 삭제
    #[serde(default)]
    pub clear_rent_free: bool,
    pub payment_day: Option<i32>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminateRequest {
    pub termination_type: TerminationType,
    pub termination_date: NaiveDate,
    pub memo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TerminationOutcome {
    pub contract: ContractDetail,
    /// 보증금 전환으로 생성된 수입 거래
    pub deposit_transaction: Option<Transaction>,
    /// 종료월 이후 삭제된 미납 청구 수
    pub removed_billings: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// 비활성화 - 청구/거래 이력 보존
    #[default]
    Soft,
    /// 서명 세션, 청구, 거래까지 모두 삭제
    Hard,
}

#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub mode: DeleteMode,
    pub contract_id: i64,
    pub room_reverted: bool,
    pub removed_billings: u64,
    pub removed_transactions: u64,
}

#[derive(Clone)]
pub struct ContractService {
    pool: DbConnection,
}

impl ContractService {
    pub fn new(pool: DbConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ContractFilter) -> AppResult<Vec<ContractDetail>> {
        let sql = format!(
            "{} WHERE (? IS NULL OR c.status = ?) \
               AND (? IS NULL OR c.room_id = ?) \
               AND (? IS NULL OR c.tenant_id = ?) \
               AND (? OR c.is_active = TRUE) \
             ORDER BY c.start_date DESC, c.id DESC",
            CONTRACT_DETAIL_SELECT
        );
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, ContractDetail>(&sql)
            .bind(status)
            .bind(status)
            .bind(filter.room_id)
            .bind(filter.room_id)
            .bind(filter.tenant_id)
            .bind(filter.tenant_id)
            .bind(filter.include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> AppResult<ContractDetail> {
        let mut conn = self.pool.acquire().await?;
        fetch_contract(&mut conn, id, false).await
    }

    /// 앞으로 `days`일 안에 끝나는 진행중 계약
    pub async fn expiring(&self, days: Option<i64>) -> AppResult<Vec<ContractDetail>> {
        let days = days.unwrap_or(DEFAULT_EXPIRING_DAYS);
        if !(0..=3650).contains(&days) {
            return Err(AppError::InvalidInput(format!(
                "days는 0~3650 사이여야 합니다: {}",
                days
            )));
        }
        let today = Local::now().date_naive();
        self.expiring_between(today, today + Duration::days(days)).await
    }

    pub(crate) async fn expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ContractDetail>> {
        let sql = format!(
            "{} WHERE c.status = '진행중' AND c.is_active = TRUE AND c.end_date BETWEEN ? AND ? \
             ORDER BY c.end_date",
            CONTRACT_DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, ContractDetail>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// 계약 생성 - 계약 저장과 호실 입주 처리를 한 트랜잭션으로 수행합니다.
    pub async fn create(&self, input: &NewContract) -> AppResult<ContractDetail> {
        let mut tx = self.pool.begin().await?;

        let room = fetch_room(&mut tx, input.room_id, true).await?;
        if !room.status.accepts_new_contract() {
            return Err(AppError::InvalidState(format!(
                "{} 호실은 현재 '{}' 상태라 계약할 수 없습니다",
                room.room_number, room.status
            )));
        }

        let tenant = fetch_tenant(&mut tx, input.tenant_id).await?;
        if !tenant.is_active {
            return Err(AppError::InvalidState(format!(
                "비활성화된 입주사입니다: {}",
                tenant.company_name
            )));
        }

        let terms = ContractTerms {
            start_date: input.start_date,
            end_date: input.end_date,
            rent_free_start: input.rent_free_start,
            rent_free_end: input.rent_free_end,
            payment_day: input.payment_day,
            monthly_rent: input.monthly_rent.unwrap_or(room.monthly_rent),
            deposit: input.deposit.unwrap_or(room.deposit),
            management_fee: input.management_fee.unwrap_or(room.management_fee),
        };
        terms.validate()?;

        let issue_month = YearMonth::current();
        let latest: Option<String> = sqlx::query_scalar(
            "SELECT contract_number FROM contracts WHERE contract_number LIKE ? \
             ORDER BY contract_number DESC LIMIT 1 FOR UPDATE",
        )
        .bind(format!("C{:04}{:02}-%", issue_month.year(), issue_month.month()))
        .fetch_optional(&mut *tx)
        .await?;
        let contract_number = contract_rules::next_contract_number(issue_month, latest.as_deref());

        let result = sqlx::query(
            "INSERT INTO contracts (contract_number, room_id, tenant_id, start_date, end_date, monthly_rent, deposit, \
             management_fee, rent_free_start, rent_free_end, payment_day, status, deposit_status, is_active, memo) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '진행중', '보관중', TRUE, ?)",
        )
        .bind(&contract_number)
        .bind(room.id)
        .bind(tenant.id)
        .bind(terms.start_date)
        .bind(terms.end_date)
        .bind(terms.monthly_rent)
        .bind(terms.deposit)
        .bind(terms.management_fee)
        .bind(terms.rent_free_start)
        .bind(terms.rent_free_end)
        .bind(terms.payment_day)
        .bind(normalize_optional(input.memo.clone()))
        .execute(&mut *tx)
        .await?;
        let contract_id = result.last_insert_id() as i64;

        transition_room(
            &mut tx,
            &room,
            RoomStatus::Occupied,
            Occupant {
                tenant_id: Some(tenant.id),
                company_name: Some(tenant.company_name.clone()),
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            contract_id,
            contract_number = %contract_number,
            room = %room.room_number,
            tenant = %tenant.company_name,
            "계약 생성"
        );
        self.get(contract_id).await
    }

    pub async fn update(&self, id: i64, update: &ContractUpdate) -> AppResult<ContractDetail> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_contract(&mut tx, id, true).await?.contract;
        if !current.is_in_progress() {
            return Err(AppError::InvalidState(
                "진행중인 계약만 수정할 수 있습니다".to_string(),
            ));
        }

        let (rent_free_start, rent_free_end) = if update.clear_rent_free {
            (None, None)
        } else if update.rent_free_start.is_some() || update.rent_free_end.is_some() {
            (update.rent_free_start, update.rent_free_end)
        } else {
            (current.rent_free_start, current.rent_free_end)
        };

        let terms = ContractTerms {
            start_date: current.start_date,
            end_date: update.end_date.unwrap_or(current.end_date),
            rent_free_start,
            rent_free_end,
            payment_day: update.payment_day.or(current.payment_day),
            monthly_rent: update.monthly_rent.unwrap_or(current.monthly_rent),
            deposit: current.deposit,
            management_fee: update.management_fee.unwrap_or(current.management_fee),
        };
        terms.validate()?;

        let memo = match &update.memo {
            Some(memo) => normalize_optional(Some(memo.clone())),
            None => current.memo.clone(),
        };

        sqlx::query(
            "UPDATE contracts SET monthly_rent = ?, management_fee = ?, end_date = ?, rent_free_start = ?, \
             rent_free_end = ?, payment_day = ?, memo = ? WHERE id = ?",
        )
        .bind(terms.monthly_rent)
        .bind(terms.management_fee)
        .bind(terms.end_date)
        .bind(terms.rent_free_start)
        .bind(terms.rent_free_end)
        .bind(terms.payment_day)
        .bind(memo)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(contract_id = id, "계약 조건 변경");
        self.get(id).await
    }

    /// 계약 종료
    ///
    /// 보증금 전환 거래 생성, 종료월 이후 미납 청구 삭제, 호실 계약종료 처리를
    /// 한 트랜잭션으로 수행합니다.
    pub async fn terminate(&self, id: i64, request: &TerminateRequest) -> AppResult<TerminationOutcome> {
        let mut tx = self.pool.begin().await?;

        let detail = fetch_contract(&mut tx, id, true).await?;
        let contract = &detail.contract;
        if !contract.is_in_progress() {
            return Err(AppError::InvalidState(format!(
                "진행중인 계약만 종료할 수 있습니다 (현재: {})",
                contract.status
            )));
        }
        contract_rules::validate_termination_date(contract.start_date, request.termination_date)?;

        let termination_month = YearMonth::of(request.termination_date);
        let new_status = request.termination_type.resulting_status();

        let conversion = deposit::convert_on_termination(
            request.termination_type,
            contract.deposit,
            contract.deposit_status,
            &detail.company_name,
            &detail.room_number,
        );

        let mut deposit_transaction_id = None;
        let mut deposit_status = contract.deposit_status;
        if let Some(conversion) = conversion {
            ensure_month_open(&mut tx, termination_month).await?;

            let mut draft = TransactionDraft::income(
                request.termination_date,
                conversion.category,
                conversion.amount,
                conversion.description,
            );
            draft.contract_id = Some(contract.id);
            draft.tenant_id = Some(contract.tenant_id);
            deposit_transaction_id = Some(insert_transaction(&mut tx, &draft).await?);
            deposit_status = conversion.deposit_status;
        }

        sqlx::query(
            "UPDATE contracts SET status = ?, deposit_status = ?, termination_date = ?, termination_memo = ? WHERE id = ?",
        )
        .bind(new_status.as_str())
        .bind(deposit_status.as_str())
        .bind(request.termination_date)
        .bind(normalize_optional(request.memo.clone()))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let removed_billings = sqlx::query(
            "DELETE FROM monthly_billings WHERE contract_id = ? AND status = '미납' AND billing_month > ?",
        )
        .bind(id)
        .bind(termination_month.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let room = fetch_room(&mut tx, contract.room_id, true).await?;
        transition_room(&mut tx, &room, RoomStatus::ContractEnded, Occupant::default()).await?;

        let deposit_transaction = match deposit_transaction_id {
            Some(transaction_id) => Some(fetch_transaction(&mut tx, transaction_id).await?),
            None => None,
        };

        tx.commit().await?;

        info!(
            contract_id = id,
            termination = %request.termination_type,
            deposit = contract.deposit,
            deposit_status = %deposit_status,
            removed_billings,
            "계약 종료"
        );

        Ok(TerminationOutcome {
            contract: self.get(id).await?,
            deposit_transaction,
            removed_billings,
        })
    }

    /// 계약 삭제
    ///
    /// - soft: 비활성화, 청구/거래 이력 보존
    /// - hard: 서명 세션, 청구, 거래, 계약 순으로 삭제
    ///
    /// 호실의 현재 입주사가 이 계약의 입주사이면 호실을 공실로 되돌립니다.
    pub async fn delete(&self, id: i64, mode: DeleteMode) -> AppResult<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let contract = fetch_contract(&mut tx, id, true).await?.contract;
        let mut outcome = DeleteOutcome {
            mode,
            contract_id: id,
            room_reverted: false,
            removed_billings: 0,
            removed_transactions: 0,
        };

        match mode {
            DeleteMode::Soft => {
                if !contract.is_active {
                    return Err(AppError::InvalidState("이미 비활성화된 계약입니다".to_string()));
                }
                sqlx::query("UPDATE contracts SET is_active = FALSE WHERE id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            DeleteMode::Hard => {
                let locked: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM transactions t \
                     JOIN settlements s ON s.settlement_month = DATE_FORMAT(t.transaction_date, '%Y-%m') \
                     WHERE t.contract_id = ? \
                        OR t.billing_id IN (SELECT id FROM monthly_billings WHERE contract_id = ?)",
                )
                .bind(id)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                if locked > 0 {
                    return Err(AppError::SettlementLocked(
                        "정산이 확정된 월의 거래가 있어 계약을 완전 삭제할 수 없습니다".to_string(),
                    ));
                }

                sqlx::query("DELETE FROM signing_sessions WHERE contract_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                outcome.removed_transactions = sqlx::query(
                    "DELETE FROM transactions \
                     WHERE contract_id = ? \
                        OR billing_id IN (SELECT id FROM monthly_billings WHERE contract_id = ?)",
                )
                .bind(id)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
                outcome.removed_billings =
                    sqlx::query("DELETE FROM monthly_billings WHERE contract_id = ?")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?
                        .rows_affected();
                sqlx::query("DELETE FROM contracts WHERE id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let room = fetch_room(&mut tx, contract.room_id, true).await?;
        if room.current_tenant_id == Some(contract.tenant_id) {
            transition_room(&mut tx, &room, RoomStatus::Vacant, Occupant::default()).await?;
            outcome.room_reverted = true;
        }

        tx.commit().await?;

        info!(
            contract_id = id,
            mode = ?mode,
            room_reverted = outcome.room_reverted,
            removed_billings = outcome.removed_billings,
            removed_transactions = outcome.removed_transactions,
            "계약 삭제"
        );
        Ok(outcome)
    }
}

pub(crate) async fn fetch_contract(
    conn: &mut MySqlConnection,
    id: i64,
    for_update: bool,
) -> AppResult<ContractDetail> {
    let sql = format!(
        "{} WHERE c.id = ?{}",
        CONTRACT_DETAIL_SELECT,
        if for_update { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, ContractDetail>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("계약".to_string()))
}
