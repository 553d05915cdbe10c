//! 관리자 계정 서비스
//!
//! 로그인 인증, 비밀번호 변경, 초기 관리자 생성

use shared::config::DbConnection;
use shared::model::AdminUser;
use shared::security::{hash_password, validate_password_strength, verify_password};
use shared::security::validation::{require_text, validate_username};
use shared::tool::error::{AppError, AppResult};
use tracing::{info, warn};

const ADMIN_COLUMNS: &str =
    "id, username, password_hash, name, role, is_active, last_login_at, created_at";

#[derive(Clone)]
pub struct AdminService {
    pool: DbConnection,
}

impl AdminService {
    pub fn new(pool: DbConnection) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<AdminUser>> {
        let sql = format!("SELECT {} FROM admin_users WHERE username = ?", ADMIN_COLUMNS);
        let admin = sqlx::query_as::<_, AdminUser>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    pub async fn get(&self, id: i64) -> AppResult<AdminUser> {
        let sql = format!("SELECT {} FROM admin_users WHERE id = ?", ADMIN_COLUMNS);
        sqlx::query_as::<_, AdminUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("관리자".to_string()))
    }

    /// 아이디/비밀번호 확인 후 마지막 로그인 시각을 갱신합니다.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<AdminUser> {
        let invalid = || AppError::AuthError("아이디 또는 비밀번호가 올바르지 않습니다".to_string());

        let admin = match self.find_by_username(username).await? {
            Some(admin) => admin,
            None => {
                warn!(username = %username, "존재하지 않는 관리자 로그인 시도");
                return Err(invalid());
            }
        };

        if !verify_password(password, &admin.password_hash) {
            warn!(admin_id = admin.id, "관리자 비밀번호 불일치");
            return Err(invalid());
        }

        if !admin.is_active {
            return Err(AppError::PermissionDenied("비활성화된 계정입니다".to_string()));
        }

        sqlx::query("UPDATE admin_users SET last_login_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(admin.id)
            .execute(&self.pool)
            .await?;

        info!(admin_id = admin.id, username = %admin.username, "관리자 로그인");
        Ok(admin)
    }

    pub async fn change_password(
        &self,
        admin_id: i64,
        current_password: &str,
        new_password: &str,
        bcrypt_cost: u32,
    ) -> AppResult<()> {
        let admin = self.get(admin_id).await?;

        if !verify_password(current_password, &admin.password_hash) {
            return Err(AppError::AuthError("현재 비밀번호가 올바르지 않습니다".to_string()));
        }
        if current_password == new_password {
            return Err(AppError::InvalidInput(
                "새 비밀번호가 현재 비밀번호와 같습니다".to_string(),
            ));
        }
        validate_password_strength(new_password)?;

        let hashed = hash_password(new_password, bcrypt_cost)?;
        sqlx::query("UPDATE admin_users SET password_hash = ? WHERE id = ?")
            .bind(&hashed)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;

        info!(admin_id, "관리자 비밀번호 변경");
        Ok(())
    }

    /// 관리자 계정 생성 (CLI `create-admin`)
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        name: &str,
        bcrypt_cost: u32,
    ) -> AppResult<AdminUser> {
        let username = require_text("username", username)?;
        validate_username(username)?;
        validate_password_strength(password)?;
        let name = require_text("name", name)?;

        if self.find_by_username(username).await?.is_some() {
            return Err(AppError::DuplicateEntry(format!(
                "이미 존재하는 관리자 아이디: {}",
                username
            )));
        }

        let hashed = hash_password(password, bcrypt_cost)?;
        let result = sqlx::query(
            "INSERT INTO admin_users (username, password_hash, name, role, is_active) VALUES (?, ?, ?, 'admin', TRUE)",
        )
        .bind(username)
        .bind(&hashed)
        .bind(name)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        info!(admin_id = id, username = %username, "관리자 계정 생성");
        self.get(id).await
    }
}
