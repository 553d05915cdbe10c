//! 로깅 설정 관리
//!
//! 로깅 시스템의 설정 파라미터와 서비스 타입 정의를 담당합니다.

use serde::{Deserialize, Serialize};

/// 서비스 타입 열거형
///
/// 로그의 `service` 필드로 출력되어 실행 모드를 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// REST API 서버
    ApiServer,
    /// 관리 명령 (migrate, create-admin)
    Cli,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ApiServer => "api",
            ServiceType::Cli => "cli",
        }
    }
}

/// 로깅 시스템 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 기본 로그 레벨 (RUST_LOG가 없을 때 사용, 기본값: info)
    pub level: String,

    /// JSON 형식 여부 (기본값: false)
    pub json_format: bool,

    /// 타깃(모듈 경로) 출력 여부 (기본값: true)
    pub with_target: bool,

    /// ANSI 색상 사용 여부 (기본값: true)
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LOG_LEVEL") {
            config.level = val.to_lowercase();
        }

        if let Ok(val) = std::env::var("LOG_JSON_FORMAT") {
            config.json_format = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("LOG_WITH_TARGET") {
            config.with_target = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("LOG_ANSI") {
            config.ansi = val.to_lowercase() == "true";
        }

        config
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(anyhow::anyhow!("unsupported LOG_LEVEL: {}", other)),
        }
    }
}
