//! Application Error Management
//!
//! 오피스센터 서버의 모든 에러를 체계적으로 관리합니다.
//! 비즈니스 로직 에러를 HTTP 응답으로 변환하고, 심각도에 따라 로깅합니다.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// 공통 애플리케이션 에러 정의
///
/// 모든 비즈니스 로직에서 발생할 수 있는 에러를 정의합니다.
/// 각 에러는 적절한 HTTP 상태 코드로 변환됩니다.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    // 인증 관련 에러
    #[error("인증 실패: {0}")]
    AuthError(String),

    #[error("토큰 만료: {0}")]
    TokenExpired(String),

    #[error("권한 없음: {0}")]
    PermissionDenied(String),

    // 리소스 관련 에러
    #[error("{0}을(를) 찾을 수 없습니다")]
    NotFound(String),

    #[error("중복된 데이터: {0}")]
    DuplicateEntry(String),

    // 상태 전이 관련 에러
    #[error("처리할 수 없는 상태입니다: {0}")]
    InvalidState(String),

    #[error("정산이 확정된 월입니다: {0}")]
    SettlementLocked(String),

    #[error("만료되었습니다: {0}")]
    Expired(String),

    // 입력값 검증 에러
    #[error("입력값 오류: {0}")]
    InvalidInput(String),

    #[error("필수 필드 누락: {0}")]
    MissingField(String),

    #[error("잘못된 형식: {0}")]
    InvalidFormat(String),

    // 데이터베이스 관련 에러
    #[error("데이터베이스 연결 실패: {0}")]
    DatabaseConnection(String),

    #[error("데이터베이스 쿼리 실패: {0}")]
    DatabaseQuery(String),

    // 파일 저장소 에러
    #[error("파일 저장 실패: {0}")]
    Storage(String),

    // 시스템 에러
    #[error("내부 서버 에러: {0}")]
    InternalError(String),

    #[error("서비스 일시적 사용 불가: {0}")]
    ServiceUnavailable(String),

    #[error("타임아웃: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// 에러 심각도 레벨
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorSeverity {
    Critical, // 시스템 장애
    High,     // 비즈니스 로직 실패
    Medium,   // 사용자 입력 오류
    Low,      // 일반적인 경고
}

/// 클라이언트에 전달되는 에러 본문
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl AppError {
    /// 에러의 심각도를 반환합니다.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::DatabaseConnection(_)
            | AppError::ServiceUnavailable(_)
            | AppError::Configuration(_) => ErrorSeverity::Critical,

            AppError::DatabaseQuery(_)
            | AppError::Storage(_)
            | AppError::InternalError(_)
            | AppError::Timeout(_) => ErrorSeverity::High,

            AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::InvalidFormat(_)
            | AppError::AuthError(_)
            | AppError::PermissionDenied(_) => ErrorSeverity::Medium,

            _ => ErrorSeverity::Low,
        }
    }

    /// 에러를 로깅합니다.
    ///
    /// 심각도에 따라 적절한 로깅 레벨을 사용합니다.
    pub fn log(&self, context: &str) {
        let error_msg = self.to_string();

        match self.severity() {
            ErrorSeverity::Critical => error!("[CRITICAL] {} - {}", context, error_msg),
            ErrorSeverity::High => error!("[HIGH] {} - {}", context, error_msg),
            ErrorSeverity::Medium => warn!("[MEDIUM] {} - {}", context, error_msg),
            ErrorSeverity::Low => info!("[LOW] {} - {}", context, error_msg),
        }
    }

    /// 응답 본문에 들어가는 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            AppError::AuthError(_) => "AUTH_FAILED",
            AppError::TokenExpired(_) => "TOKEN_EXPIRED",
            AppError::PermissionDenied(_) => "PERMISSION_DENIED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::SettlementLocked(_) => "SETTLEMENT_LOCKED",
            AppError::Expired(_) => "EXPIRED",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::MissingField(_) => "MISSING_FIELD",
            AppError::InvalidFormat(_) => "INVALID_FORMAT",
            AppError::DatabaseConnection(_) | AppError::DatabaseQuery(_) => "DATABASE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::InternalError(_) | AppError::Configuration(_) => "INTERNAL_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Timeout(_) => "TIMEOUT",
        }
    }

    /// 클라이언트에 노출해도 되는 메시지
    ///
    /// 데이터베이스/내부 에러는 상세 내용을 숨깁니다.
    fn public_message(&self) -> String {
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::High => match self {
                AppError::Timeout(_) => "요청 처리 시간이 초과되었습니다".to_string(),
                AppError::ServiceUnavailable(_) | AppError::DatabaseConnection(_) => {
                    "서비스를 일시적으로 사용할 수 없습니다".to_string()
                }
                _ => "서버 내부 오류가 발생했습니다".to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(_) | AppError::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEntry(_)
            | AppError::InvalidState(_)
            | AppError::SettlementLocked(_) => StatusCode::CONFLICT,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::InvalidInput(_) | AppError::MissingField(_) | AppError::InvalidFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ServiceUnavailable(_) | AppError::DatabaseConnection(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::DatabaseQuery(_)
            | AppError::Storage(_)
            | AppError::InternalError(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log("HTTP 응답 변환");
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.code(),
            message: self.public_message(),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("레코드".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    AppError::DuplicateEntry(db_err.message().to_string())
                } else {
                    AppError::DatabaseQuery(db_err.to_string())
                }
            }
            sqlx::Error::PoolTimedOut => {
                AppError::Timeout("데이터베이스 연결 풀 타임아웃".to_string())
            }
            sqlx::Error::PoolClosed => {
                AppError::ServiceUnavailable("데이터베이스 연결 풀이 닫혔습니다".to_string())
            }
            sqlx::Error::Io(io_err) => AppError::DatabaseConnection(io_err.to_string()),
            other => AppError::DatabaseQuery(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Storage(error.to_string())
    }
}

/// 편의를 위한 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn body_text(err: &AppError) -> String {
        match err.error_response().into_body().try_into_bytes() {
            Ok(bytes) => String::from_utf8(bytes.to_vec()).unwrap(),
            Err(_) => panic!("error body should be a single chunk"),
        }
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AppError::NotFound("호실".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::AuthError("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidState("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::SettlementLocked("2024-03".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Expired("x".into()).status_code(), StatusCode::GONE);
        assert_eq!(
            AppError::PermissionDenied("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DatabaseQuery("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_severity() {
        assert_eq!(
            AppError::DatabaseConnection("x".into()).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            AppError::InvalidInput("x".into()).severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(AppError::NotFound("x".into()).severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_database_details_are_hidden() {
        let err = AppError::DatabaseQuery("Table 'rooms' doesn't exist".into());
        let text = body_text(&err);
        assert!(text.contains("DATABASE_ERROR"));
        assert!(!text.contains("rooms"));
    }

    #[test]
    fn test_validation_message_is_exposed() {
        let err = AppError::InvalidInput("계약 종료일이 시작일보다 빠릅니다".into());
        let text = body_text(&err);
        assert!(text.contains("INVALID_INPUT"));
        assert!(text.contains("계약 종료일"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
