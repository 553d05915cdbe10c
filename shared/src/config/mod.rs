//! 설정 모듈
//!
//! `.env` 파일과 환경변수에서 데이터베이스/서버/보안 설정을 읽어옵니다.

pub mod app_config;
pub mod db;

pub use app_config::{AppConfig, ServerConfig};
pub use db::{DbConfig, DbConnection, DbSettings};

use tracing::{info, warn};

/// `.env` 파일 로드 - 현재 디렉토리, 상위 디렉토리 순으로 찾습니다.
///
/// 워크스페이스 하위 패키지에서 실행되는 경우에도 루트의 `.env`를 읽습니다.
pub fn load_env() {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let workspace_env = current_dir.join(".env");
    let parent_env = current_dir.parent().map(|p| p.join(".env"));

    if workspace_env.exists() {
        dotenv::from_path(&workspace_env).ok();
        info!("환경 파일 로드: {:?}", workspace_env);
        return;
    }

    if let Some(parent_env) = parent_env {
        if parent_env.exists() {
            dotenv::from_path(&parent_env).ok();
            info!("환경 파일 로드: {:?}", parent_env);
            return;
        }
    }

    dotenv::dotenv().ok();
    warn!(".env 파일을 찾을 수 없어서 환경 변수를 직접 사용합니다.");
}

/// 환경변수 값을 읽고 없으면 기본값을 사용합니다.
pub(crate) fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 숫자형 환경변수. 값이 있는데 숫자가 아니면 설정 오류입니다.
pub(crate) fn env_parse<T: std::str::FromStr>(
    key: &str,
    default: T,
) -> Result<T, crate::tool::error::AppError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            crate::tool::error::AppError::Configuration(format!(
                "{}는 숫자여야 합니다: {}",
                key, raw
            ))
        }),
        Err(_) => Ok(default),
    }
}
