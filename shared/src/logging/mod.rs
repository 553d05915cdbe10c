//! 로깅 시스템
//!
//! `tracing` + `tracing-subscriber` 기반의 로깅 초기화를 제공합니다.
//!
//! # 사용 예시
//! ```rust,no_run
//! use shared::logging::{init_logging, LoggingConfig, ServiceType};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(ServiceType::ApiServer, &LoggingConfig::from_env())?;
//!     tracing::info!("서버 시작");
//!     Ok(())
//! }
//! ```

pub mod config;

pub use config::{LoggingConfig, ServiceType};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// 로깅 시스템 초기화 함수
///
/// `RUST_LOG`가 설정되어 있으면 그 값을, 없으면 `config.level`을 필터로 사용합니다.
/// 이미 전역 subscriber가 설정된 경우(테스트 등)에는 조용히 넘어갑니다.
pub fn init_logging(service_type: ServiceType, config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi && !config.json_format);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_ok() {
        tracing::info!(
            service = service_type.as_str(),
            json = config.json_format,
            "로깅 시스템 초기화 완료"
        );
    }

    Ok(())
}
