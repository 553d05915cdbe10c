//! 비즈니스 규칙
//!
//! DB 접근 없이 계산만 하는 규칙들입니다. 서비스 계층이 트랜잭션 안에서 호출합니다.

pub mod billing_rules;
pub mod contract_rules;
pub mod deposit;
pub mod room_status;
pub mod settlement_report;
