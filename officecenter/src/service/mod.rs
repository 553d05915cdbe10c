//! 비즈니스 서비스 계층
//!
//! 각 서비스는 MariaDB 연결 풀을 보유하고, 여러 테이블을 함께 바꾸는 작업은
//! 하나의 트랜잭션으로 처리합니다.

pub mod admin_service;
pub mod billing_service;
pub mod contract_service;
pub mod dashboard_service;
pub mod document_service;
pub mod room_service;
pub mod settlement_service;
pub mod signature_storage;
pub mod signing_service;
pub mod tenant_service;
pub mod transaction_service;

pub use admin_service::AdminService;
pub use billing_service::BillingService;
pub use contract_service::ContractService;
pub use dashboard_service::DashboardService;
pub use room_service::RoomService;
pub use settlement_service::SettlementService;
pub use signature_storage::SignatureStorage;
pub use signing_service::SigningService;
pub use tenant_service::TenantService;
pub use transaction_service::TransactionService;
