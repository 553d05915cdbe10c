//! 임대 흐름 통합 테스트 (MariaDB 필요)
//!
//! `TEST_DATABASE_URL`이 없으면 건너뜁니다.
//! 예: `TEST_DATABASE_URL=mysql://root:pw@127.0.0.1:3306/officecenter_test cargo test -p officecenter`

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use officecenter::service::billing_service::{BillingFilter, ConfirmPayment};
use officecenter::service::contract_service::{DeleteMode, NewContract, TerminateRequest};
use officecenter::service::document_service::ContractRenderer;
use officecenter::service::room_service::RoomInput;
use officecenter::service::signing_service::{
    CreateSessionRequest, SessionFilter, SignatureRequest, TenantSignRequest,
};
use officecenter::service::tenant_service::{TenantFilter, TenantInput};
use officecenter::service::transaction_service::TransactionInput;
use officecenter::service::{
    BillingService, ContractService, RoomService, SettlementService, SignatureStorage,
    SigningService, TenantService, TransactionService,
};
use officecenter::MIGRATOR;
use shared::config::{DbConfig, DbConnection, DbSettings};
use shared::model::{
    BillingStatus, ContractStatus, ContractDetail, DepositStatus, Room, RoomStatus, RoomType,
    SigningStatus, Tenant, TenantType, TerminationType, TransactionCategory, TransactionType,
};
use shared::tool::error::AppError;
use shared::tool::YearMonth;
use std::time::Duration;

const TEST_MONTHS: [&str; 3] = ["2001-03", "2001-04", "2001-05"];

async fn test_pool() -> Option<DbConnection> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL 미설정 - 통합 테스트를 건너뜁니다");
            return None;
        }
    };

    let settings = DbSettings {
        host: String::new(),
        port: 0,
        user: String::new(),
        password: String::new(),
        database: String::new(),
        url_override: Some(url),
        max_connections: 5,
        min_connections: 0,
        acquire_timeout: Duration::from_secs(10),
    };
    let db = DbConfig::connect(&settings).await.unwrap();
    MIGRATOR.run(db.get_pool()).await.unwrap();
    Some(db.pool)
}

async fn clear_settlements(pool: &DbConnection) {
    for month in TEST_MONTHS {
        sqlx::query("DELETE FROM settlements WHERE settlement_month = ?")
            .bind(month)
            .execute(pool)
            .await
            .unwrap();
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ym(value: &str) -> YearMonth {
    value.parse().unwrap()
}

fn suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn tenant_input(company_name: String) -> TenantInput {
    TenantInput {
        company_name,
        representative: Some("김대표".to_string()),
        business_number: None,
        tenant_type: TenantType::Corporation,
        is_resident: true,
        phone: None,
        email: None,
        address: None,
        memo: None,
    }
}

/// 호실 + 입주사 + 진행중 계약 (보증금 1,000,000원)
async fn lease_fixture(
    pool: &DbConnection,
    prefix: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> (Room, Tenant, ContractDetail) {
    let suffix = suffix();
    let room = RoomService::new(pool.clone())
        .create(&RoomInput {
            room_number: format!("{}-{}", prefix, suffix),
            floor: Some(5),
            room_type: RoomType::Single,
            area: None,
            monthly_rent: 440_000,
            deposit: 1_000_000,
            management_fee: 0,
            memo: None,
        })
        .await
        .unwrap();
    let tenant = TenantService::new(pool.clone())
        .create(&tenant_input(format!("{}상사 {}", prefix, suffix)))
        .await
        .unwrap();
    let contract = ContractService::new(pool.clone())
        .create(&NewContract {
            room_id: room.id,
            tenant_id: tenant.id,
            start_date: start,
            end_date: end,
            monthly_rent: None,
            deposit: None,
            management_fee: None,
            rent_free_start: None,
            rent_free_end: None,
            payment_day: None,
            memo: None,
        })
        .await
        .unwrap();
    (room, tenant, contract)
}

async fn cleanup_lease(pool: &DbConnection, room: &Room, tenant: &Tenant, contract_id: i64) {
    ContractService::new(pool.clone())
        .delete(contract_id, DeleteMode::Hard)
        .await
        .unwrap();
    RoomService::new(pool.clone()).delete(room.id).await.unwrap();
    TenantService::new(pool.clone())
        .deactivate(tenant.id)
        .await
        .unwrap();
}

fn png_signature() -> String {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(b"signature-strokes");
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

async fn push_expiry_into_past(pool: &DbConnection, session_id: i64) {
    sqlx::query("UPDATE signing_sessions SET expires_at = ? WHERE id = ?")
        .bind(Utc::now() - ChronoDuration::days(1))
        .bind(session_id)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_full_lease_flow() {
    let Some(pool) = test_pool().await else {
        return;
    };
    clear_settlements(&pool).await;

    let rooms = RoomService::new(pool.clone());
    let tenants = TenantService::new(pool.clone());
    let contracts = ContractService::new(pool.clone());
    let billings = BillingService::new(pool.clone());
    let transactions = TransactionService::new(pool.clone());
    let settlements = SettlementService::new(pool.clone());

    let suffix = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();

    // 호실, 입주사
    let room = rooms
        .create(&RoomInput {
            room_number: format!("T-{}", suffix),
            floor: Some(3),
            room_type: RoomType::Single,
            area: Some(6.6),
            monthly_rent: 550_000,
            deposit: 1_000_000,
            management_fee: 50_000,
            memo: None,
        })
        .await
        .unwrap();
    assert_eq!(room.status, RoomStatus::Vacant);

    let company = format!("테스트상사 {}", suffix);
    let tenant = tenants
        .create(&TenantInput {
            company_name: company.clone(),
            representative: Some("김대표".to_string()),
            business_number: Some("123-45-67890".to_string()),
            tenant_type: TenantType::Corporation,
            is_resident: true,
            phone: Some("010-1234-5678".to_string()),
            email: None,
            address: None,
            memo: None,
        })
        .await
        .unwrap();

    // 계약 생성 - 금액은 호실 기본값, 3월은 렌트프리
    let contract = contracts
        .create(&NewContract {
            room_id: room.id,
            tenant_id: tenant.id,
            start_date: date(2001, 3, 1),
            end_date: date(2002, 2, 28),
            monthly_rent: None,
            deposit: None,
            management_fee: None,
            rent_free_start: Some(date(2001, 3, 1)),
            rent_free_end: Some(date(2001, 3, 31)),
            payment_day: Some(31),
            memo: None,
        })
        .await
        .unwrap();
    assert_eq!(contract.contract.status, ContractStatus::Active);
    assert_eq!(contract.contract.monthly_rent, 550_000);
    assert!(contract.contract.contract_number.starts_with('C'));

    let occupied = rooms.get(room.id).await.unwrap();
    assert_eq!(occupied.status, RoomStatus::Occupied);
    assert_eq!(occupied.current_tenant_id, Some(tenant.id));
    assert_eq!(occupied.current_company_name.as_deref(), Some(company.as_str()));

    // 같은 호실에 두 번째 계약은 불가
    let second = contracts
        .create(&NewContract {
            room_id: room.id,
            tenant_id: tenant.id,
            start_date: date(2001, 3, 1),
            end_date: date(2001, 12, 31),
            monthly_rent: None,
            deposit: None,
            management_fee: None,
            rent_free_start: None,
            rent_free_end: None,
            payment_day: None,
            memo: None,
        })
        .await;
    assert!(matches!(second, Err(AppError::InvalidState(_))));

    let filter_for = |month: &str| BillingFilter {
        month: Some(ym(month)),
        status: None,
        contract_id: Some(contract.contract.id),
    };

    // 3월 - 렌트프리라 청구 없음
    billings.generate(ym("2001-03")).await.unwrap();
    assert!(billings.list(&filter_for("2001-03")).await.unwrap().is_empty());

    // 4월 - 청구 생성, 재생성 시 중복 없음
    billings.generate(ym("2001-04")).await.unwrap();
    billings.generate(ym("2001-04")).await.unwrap();
    let april = billings.list(&filter_for("2001-04")).await.unwrap();
    assert_eq!(april.len(), 1);
    let bill = &april[0].billing;
    assert_eq!(bill.total_amount, 600_000);
    assert_eq!(bill.due_date, date(2001, 4, 30));
    assert_eq!(bill.status, BillingStatus::Unpaid);

    // 부분 입금 확인
    let paid = billings
        .confirm(
            bill.id,
            ConfirmPayment {
                paid_amount: Some(550_000),
                paid_date: Some(date(2001, 4, 10)),
                payment_method: Some("계좌이체".to_string()),
                memo: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(paid.billing.status, BillingStatus::Paid);
    let payment_tx = transactions
        .get(paid.billing.transaction_id.unwrap())
        .await
        .unwrap();
    assert_eq!(payment_tx.category, TransactionCategory::Rent);
    assert_eq!(payment_tx.amount, 550_000);
    assert_eq!(payment_tx.vat, 50_000);
    assert_eq!(payment_tx.supply_amount, 500_000);
    let description = payment_tx.description.unwrap_or_default();
    assert!(description.contains("청구 600,000원"));
    assert!(description.contains("입금 550,000원"));

    // 청구 연결 거래는 직접 삭제 불가
    assert!(transactions.delete(payment_tx.id).await.is_err());

    // 4월 정산 확정 후에는 4월 거래 변경 불가
    let report = settlements
        .confirm(ym("2001-04"), 1)
        .await
        .unwrap();
    assert!(report.confirmed);
    assert!(report.total_income >= 550_000);
    assert!(matches!(
        settlements.confirm(ym("2001-04"), 1).await,
        Err(AppError::InvalidState(_)) | Err(AppError::DuplicateEntry(_))
    ));

    let locked = transactions
        .create(&TransactionInput {
            transaction_date: date(2001, 4, 20),
            transaction_type: TransactionType::Expense,
            category: TransactionCategory::Repair,
            amount: 110_000,
            vat_included: true,
            description: None,
            payment_method: None,
            contract_id: None,
            tenant_id: None,
        })
        .await;
    assert!(matches!(locked, Err(AppError::SettlementLocked(_))));
    assert!(matches!(
        billings.cancel(bill.id).await,
        Err(AppError::SettlementLocked(_))
    ));

    // 중도종료 - 보증금 위약금 전환, 호실 계약종료
    let outcome = contracts
        .terminate(
            contract.contract.id,
            &TerminateRequest {
                termination_type: TerminationType::Early,
                termination_date: date(2001, 5, 15),
                memo: Some("사업장 이전".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.contract.contract.status, ContractStatus::EarlyTerminated);
    assert_eq!(
        outcome.contract.contract.deposit_status,
        DepositStatus::ConvertedToPenalty
    );
    let penalty = outcome.deposit_transaction.unwrap();
    assert_eq!(penalty.category, TransactionCategory::Penalty);
    assert_eq!(penalty.amount, 1_000_000);

    let ended = rooms.get(room.id).await.unwrap();
    assert_eq!(ended.status, RoomStatus::ContractEnded);
    assert_eq!(ended.current_tenant_id, None);
    assert_eq!(ended.last_company_name.as_deref(), Some(company.as_str()));

    // 종료된 계약은 다시 종료할 수 없음
    assert!(contracts
        .terminate(
            contract.contract.id,
            &TerminateRequest {
                termination_type: TerminationType::Expiry,
                termination_date: date(2001, 6, 1),
                memo: None,
            },
        )
        .await
        .is_err());

    // 확정된 월의 거래가 있으면 완전 삭제 불가, 정산 정리 후 삭제
    assert!(matches!(
        contracts.delete(contract.contract.id, DeleteMode::Hard).await,
        Err(AppError::SettlementLocked(_))
    ));
    clear_settlements(&pool).await;
    let deleted = contracts
        .delete(contract.contract.id, DeleteMode::Hard)
        .await
        .unwrap();
    assert!(deleted.removed_transactions >= 2);

    rooms.delete(room.id).await.unwrap();
    tenants.deactivate(tenant.id).await.unwrap();
}

#[tokio::test]
async fn test_room_status_transitions_keep_last_company() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let rooms = RoomService::new(pool.clone());
    let suffix = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();

    let room = rooms
        .create(&RoomInput {
            room_number: format!("S-{}", suffix),
            floor: None,
            room_type: RoomType::Double,
            area: None,
            monthly_rent: 800_000,
            deposit: 0,
            management_fee: 0,
            memo: None,
        })
        .await
        .unwrap();

    let occupied = rooms
        .change_status(
            room.id,
            officecenter::service::room_service::RoomStatusChange {
                status: RoomStatus::Occupied,
                tenant_id: None,
                company_name: Some("임시입주".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(occupied.current_company_name.as_deref(), Some("임시입주"));

    let vacant = rooms
        .change_status(
            room.id,
            officecenter::service::room_service::RoomStatusChange {
                status: RoomStatus::Vacant,
                tenant_id: None,
                company_name: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(vacant.current_company_name, None);
    assert_eq!(vacant.last_company_name.as_deref(), Some("임시입주"));

    let maintenance = rooms
        .change_status(
            room.id,
            officecenter::service::room_service::RoomStatusChange {
                status: RoomStatus::Maintenance,
                tenant_id: None,
                company_name: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(maintenance.last_company_name.as_deref(), Some("임시입주"));

    let no_occupant = rooms
        .change_status(
            room.id,
            officecenter::service::room_service::RoomStatusChange {
                status: RoomStatus::Occupied,
                tenant_id: None,
                company_name: None,
            },
        )
        .await;
    assert!(matches!(no_occupant, Err(AppError::InvalidInput(_)) | Err(AppError::MissingField(_))));

    rooms.delete(room.id).await.unwrap();
}

#[tokio::test]
async fn test_signing_session_flow() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let upload_dir = tempfile::tempdir().unwrap();
    let signing = SigningService::new(
        pool.clone(),
        SignatureStorage::new(upload_dir.path()),
        ContractRenderer::new().unwrap(),
        "https://office.test",
        7,
    );
    let contracts = ContractService::new(pool.clone());
    let (room, tenant, contract) =
        lease_fixture(&pool, "SG", date(2001, 6, 1), date(2002, 5, 31)).await;
    let contract_id = contract.contract.id;

    let created = signing
        .create_session(contract_id, &CreateSessionRequest::default(), 1)
        .await
        .unwrap();
    assert_eq!(created.session.status, SigningStatus::Pending);
    assert_eq!(
        created.signing_url,
        format!("https://office.test/sign/{}", created.token)
    );
    assert_ne!(created.session.token_hash, created.token);

    // 열린 세션이 있으면 새 세션 불가
    assert!(matches!(
        signing
            .create_session(contract_id, &CreateSessionRequest::default(), 1)
            .await,
        Err(AppError::InvalidState(_))
    ));

    // 입주사 서명 전에는 관리자 서명 불가
    let admin_signature = SignatureRequest {
        signature: png_signature(),
    };
    assert!(matches!(
        signing.admin_sign(created.session.id, &admin_signature, 1).await,
        Err(AppError::InvalidState(_))
    ));

    let view = signing.view(&created.token).await.unwrap();
    assert!(view.document.contains(&contract.contract.contract_number));

    let tenant_request = TenantSignRequest {
        signer_name: "김대표".to_string(),
        signature: png_signature(),
        agreed: true,
    };
    let signed = signing
        .tenant_sign(&created.token, &tenant_request, Some("203.0.113.7".to_string()))
        .await
        .unwrap();
    assert_eq!(signed.status, SigningStatus::TenantSigned);
    assert_eq!(signed.tenant_ip.as_deref(), Some("203.0.113.7"));
    assert!(matches!(
        signing.tenant_sign(&created.token, &tenant_request, None).await,
        Err(AppError::InvalidState(_))
    ));

    // 입주사가 서명한 뒤에는 링크 기한이 지나도 만료되지 않음
    push_expiry_into_past(&pool, created.session.id).await;
    let listed = signing
        .list(&SessionFilter {
            contract_id: Some(contract_id),
        })
        .await
        .unwrap();
    assert_eq!(listed[0].status, SigningStatus::TenantSigned);

    let completed = signing
        .admin_sign(created.session.id, &admin_signature, 1)
        .await
        .unwrap();
    assert_eq!(completed.status, SigningStatus::Completed);
    assert!(contracts
        .get(contract_id)
        .await
        .unwrap()
        .contract
        .signed_at
        .is_some());

    let document = signing.contract_document(contract_id).await.unwrap();
    assert_eq!(document.matches("<img").count(), 2);

    // 취소된 세션의 공개 화면은 409
    let cancelled = signing
        .create_session(contract_id, &CreateSessionRequest { expires_in_days: Some(3) }, 1)
        .await
        .unwrap();
    signing.cancel(cancelled.session.id).await.unwrap();
    assert!(matches!(
        signing.view(&cancelled.token).await,
        Err(AppError::InvalidState(_))
    ));
    assert!(signing.cancel(cancelled.session.id).await.is_err());

    // 기한이 지난 대기 세션은 만료 처리 후 410
    let stale = signing
        .create_session(contract_id, &CreateSessionRequest::default(), 1)
        .await
        .unwrap();
    push_expiry_into_past(&pool, stale.session.id).await;
    assert!(matches!(
        signing.view(&stale.token).await,
        Err(AppError::Expired(_))
    ));
    assert_eq!(
        signing.get(stale.session.id).await.unwrap().status,
        SigningStatus::Expired
    );
    assert!(matches!(
        signing.tenant_sign(&stale.token, &tenant_request, None).await,
        Err(AppError::Expired(_))
    ));

    assert!(matches!(
        signing.view(&"0".repeat(64)).await,
        Err(AppError::NotFound(_))
    ));

    cleanup_lease(&pool, &room, &tenant, contract_id).await;
}

#[tokio::test]
async fn test_expiry_termination_converts_deposit_to_usage_fee() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let contracts = ContractService::new(pool.clone());
    let (room, tenant, contract) =
        lease_fixture(&pool, "EX", date(2001, 7, 1), date(2001, 7, 31)).await;

    let outcome = contracts
        .terminate(
            contract.contract.id,
            &TerminateRequest {
                termination_type: TerminationType::Expiry,
                termination_date: date(2001, 7, 31),
                memo: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.contract.contract.status, ContractStatus::Expired);
    assert_eq!(
        outcome.contract.contract.deposit_status,
        DepositStatus::ConvertedToUsageFee
    );
    let usage_fee = outcome.deposit_transaction.unwrap();
    assert_eq!(usage_fee.category, TransactionCategory::UsageFee);
    assert_eq!(usage_fee.transaction_type, TransactionType::Income);
    assert_eq!(usage_fee.amount, 1_000_000);
    assert_eq!(usage_fee.transaction_date, date(2001, 7, 31));
    assert_eq!(usage_fee.contract_id, Some(contract.contract.id));

    let ended = RoomService::new(pool.clone()).get(room.id).await.unwrap();
    assert_eq!(ended.status, RoomStatus::ContractEnded);
    assert_eq!(ended.last_company_name, Some(tenant.company_name.clone()));

    cleanup_lease(&pool, &room, &tenant, contract.contract.id).await;
}

#[tokio::test]
async fn test_soft_delete_reverts_room_and_keeps_last_company() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let contracts = ContractService::new(pool.clone());
    let rooms = RoomService::new(pool.clone());
    let (room, tenant, contract) =
        lease_fixture(&pool, "SD", date(2001, 8, 1), date(2002, 7, 31)).await;

    let deleted = contracts
        .delete(contract.contract.id, DeleteMode::Soft)
        .await
        .unwrap();
    assert!(deleted.room_reverted);
    assert_eq!(deleted.removed_transactions, 0);

    let vacant = rooms.get(room.id).await.unwrap();
    assert_eq!(vacant.status, RoomStatus::Vacant);
    assert_eq!(vacant.current_tenant_id, None);
    assert_eq!(vacant.last_company_name, Some(tenant.company_name.clone()));

    let kept = contracts.get(contract.contract.id).await.unwrap();
    assert!(!kept.contract.is_active);
    assert!(matches!(
        contracts.delete(contract.contract.id, DeleteMode::Soft).await,
        Err(AppError::InvalidState(_))
    ));

    cleanup_lease(&pool, &room, &tenant, contract.contract.id).await;
}

#[tokio::test]
async fn test_tenant_search_treats_wildcards_literally() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenants = TenantService::new(pool.clone());
    let suffix = suffix();

    let underscore = tenants
        .create(&tenant_input(format!("밑줄_{}", suffix)))
        .await
        .unwrap();
    let letter = tenants
        .create(&tenant_input(format!("밑줄A{}", suffix)))
        .await
        .unwrap();

    let found = tenants
        .list(&TenantFilter {
            q: Some(format!("밑줄_{}", suffix)),
            is_resident: None,
            include_inactive: false,
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, underscore.id);

    tenants.deactivate(underscore.id).await.unwrap();
    tenants.deactivate(letter.id).await.unwrap();
}
