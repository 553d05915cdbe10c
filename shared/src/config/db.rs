//! MariaDB Database Configuration
//!
//! 오피스센터 서버를 위한 MariaDB/MySQL 데이터베이스 연결 설정입니다.
//! .env 파일에서 데이터베이스 연결 정보를 읽어와 연결 풀을 관리합니다.

use crate::config::{env_or, env_parse};
use crate::tool::error::AppError;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::time::Duration;
use tracing::{error, info, warn};

/// MariaDB 연결 풀 타입 별칭
pub type DbConnection = Pool<MySql>;

/// 연결 풀 생성 전의 데이터베이스 접속 정보
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// `DATABASE_URL`이 설정된 경우 개별 항목 대신 사용합니다.
    pub url_override: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbSettings {
    /// 환경변수에서 데이터베이스 접속 정보를 읽습니다.
    ///
    /// 환경 변수가 없으면 기본값을 사용합니다.
    pub fn from_env() -> Result<Self, AppError> {
        let host = std::env::var("db_host").unwrap_or_else(|_| {
            warn!("db_host 환경변수가 없어서 localhost를 사용합니다.");
            "localhost".to_string()
        });

        let port = env_parse::<u16>("db_port", 3306)?;

        let user = std::env::var("db_id").unwrap_or_else(|_| {
            warn!("db_id 환경변수가 없어서 root를 사용합니다.");
            "root".to_string()
        });

        let password = std::env::var("db_password").unwrap_or_else(|_| {
            error!("db_password 환경변수가 필요합니다.");
            String::new()
        });

        let database = env_or("db_name", "officecenter");

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
            url_override: std::env::var("DATABASE_URL").ok(),
            max_connections: env_parse("db_max_connections", 10)?,
            min_connections: env_parse("db_min_connections", 2)?,
            acquire_timeout: Duration::from_secs(env_parse("db_acquire_timeout_secs", 10)?),
        })
    }

    /// MariaDB 연결 URL
    pub fn database_url(&self) -> String {
        match &self.url_override {
            Some(url) => url.clone(),
            None => format!(
                "mysql://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            ),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_connections == 0 {
            return Err(AppError::Configuration(
                "db_max_connections는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(AppError::Configuration(
                "db_min_connections가 db_max_connections보다 큽니다".to_string(),
            ));
        }
        Ok(())
    }

    fn pool_options(&self) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// MariaDB 데이터베이스 설정 구조체
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub pool: DbConnection,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
}

impl DbConfig {
    /// 환경변수로부터 연결 풀을 생성합니다.
    pub async fn new() -> Result<Self, AppError> {
        let settings = DbSettings::from_env()?;
        Self::connect(&settings).await
    }

    /// 접속 정보로 연결 풀을 생성합니다.
    pub async fn connect(settings: &DbSettings) -> Result<Self, AppError> {
        settings.validate()?;

        info!(
            "데이터베이스 연결 시도: {}:{}@{}/{}",
            settings.user, "***", settings.host, settings.database
        );

        let pool = settings
            .pool_options()
            .connect(&settings.database_url())
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        info!(
            "MariaDB 연결 풀 생성 완료: {}:{}",
            settings.host, settings.port
        );

        Ok(Self {
            pool,
            host: settings.host.clone(),
            port: settings.port,
            user: settings.user.clone(),
            database: settings.database.clone(),
        })
    }

    /// 연결하지 않은 상태의 풀을 만듭니다. 첫 쿼리 시점에 연결됩니다.
    pub fn connect_lazy(settings: &DbSettings) -> Result<DbConnection, AppError> {
        settings
            .pool_options()
            .connect_lazy(&settings.database_url())
            .map_err(|e| AppError::Configuration(e.to_string()))
    }

    /// 연결 풀에서 연결을 가져옵니다.
    pub fn get_pool(&self) -> &DbConnection {
        &self.pool
    }

    /// 데이터베이스 연결 상태를 확인합니다.
    pub async fn health_check(pool: &DbConnection) -> bool {
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => true,
            Err(e) => {
                error!("데이터베이스 연결 실패: {}", e);
                false
            }
        }
    }

    /// 데이터베이스 연결을 닫습니다.
    ///
    /// 애플리케이션 종료 시 호출하여 리소스를 정리합니다.
    pub async fn close(&self) {
        info!("데이터베이스 연결 풀을 닫는 중...");
        self.pool.close().await;
        info!("데이터베이스 연결 풀 종료 완료");
    }
}
