//! 애플리케이션 공유 상태

use crate::service::document_service::ContractRenderer;
use crate::service::{
    AdminService, BillingService, ContractService, DashboardService, RoomService,
    SettlementService, SignatureStorage, SigningService, TenantService, TransactionService,
};
use shared::config::{DbConnection, ServerConfig};
use shared::security::{JwtManager, SecurityConfig};
use shared::tool::error::AppResult;

/// 핸들러가 `web::Data<AppState>`로 받는 상태
#[derive(Clone)]
pub struct AppState {
    pub pool: DbConnection,
    pub jwt: JwtManager,
    pub security: SecurityConfig,
    pub admins: AdminService,
    pub rooms: RoomService,
    pub tenants: TenantService,
    pub contracts: ContractService,
    pub transactions: TransactionService,
    pub billings: BillingService,
    pub settlements: SettlementService,
    pub signing: SigningService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(
        pool: DbConnection,
        server: &ServerConfig,
        security: SecurityConfig,
    ) -> AppResult<Self> {
        let storage = SignatureStorage::new(server.upload_dir.clone());
        let renderer = ContractRenderer::new()?;

        Ok(Self {
            jwt: JwtManager::new(&security),
            admins: AdminService::new(pool.clone()),
            rooms: RoomService::new(pool.clone()),
            tenants: TenantService::new(pool.clone()),
            contracts: ContractService::new(pool.clone()),
            transactions: TransactionService::new(pool.clone()),
            billings: BillingService::new(pool.clone()),
            settlements: SettlementService::new(pool.clone()),
            signing: SigningService::new(
                pool.clone(),
                storage,
                renderer,
                server.public_base_url.clone(),
                security.signing_expiration_days,
            ),
            dashboard: DashboardService::new(pool.clone()),
            security,
            pool,
        })
    }
}
