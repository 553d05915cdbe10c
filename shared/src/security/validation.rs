//! 입력 검증 모듈
//!
//! 사업자등록번호, 연락처, 이메일 등 입주사 정보의 형식을 검증합니다.

use crate::tool::error::AppError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BUSINESS_NUMBER_PATTERN: Regex =
        Regex::new(r"^\d{3}-\d{2}-\d{5}$").expect("valid business number regex");

    static ref PHONE_PATTERN: Regex =
        Regex::new(r"^0\d{1,2}-?\d{3,4}-?\d{4}$").expect("valid phone regex");

    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex");

    static ref USERNAME_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9_-]{3,32}$").expect("valid username regex");
}

/// 사업자등록번호 (`123-45-67890`)
pub fn validate_business_number(value: &str) -> Result<(), AppError> {
    if BUSINESS_NUMBER_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(AppError::InvalidFormat(format!(
            "사업자등록번호는 000-00-00000 형식이어야 합니다: {}",
            value
        )))
    }
}

pub fn validate_phone(value: &str) -> Result<(), AppError> {
    if PHONE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(AppError::InvalidFormat(format!("연락처 형식 오류: {}", value)))
    }
}

pub fn validate_email(value: &str) -> Result<(), AppError> {
    if EMAIL_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(AppError::InvalidFormat(format!("이메일 형식 오류: {}", value)))
    }
}

pub fn validate_username(value: &str) -> Result<(), AppError> {
    if USERNAME_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(AppError::InvalidFormat(
            "아이디는 영문/숫자/_/- 3~32자여야 합니다".to_string(),
        ))
    }
}

/// 필수 문자열 필드. 공백만 있는 값도 누락으로 봅니다.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField(field.to_string()));
    }
    Ok(trimmed)
}

/// 선택 문자열 필드 정리 - 빈 문자열은 `None`으로 취급합니다.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 0 이상의 금액
pub fn require_non_negative(field: &str, amount: i64) -> Result<(), AppError> {
    if amount < 0 {
        return Err(AppError::InvalidInput(format!(
            "{}은(는) 0 이상이어야 합니다",
            field
        )));
    }
    Ok(())
}

/// 0보다 큰 금액
pub fn require_positive(field: &str, amount: i64) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::InvalidInput(format!(
            "{}은(는) 0보다 커야 합니다",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_number() {
        assert!(validate_business_number("123-45-67890").is_ok());
        assert!(validate_business_number("1234567890").is_err());
        assert!(validate_business_number("123-456-7890").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("010-1234-5678").is_ok());
        assert!(validate_phone("01012345678").is_ok());
        assert!(validate_phone("02-123-4567").is_ok());
        assert!(validate_phone("1234").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("office@example.co.kr").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("company_name", "  에이컴퍼니 ").unwrap(), "에이컴퍼니");
        assert!(matches!(
            require_text("company_name", "   "),
            Err(AppError::MissingField(_))
        ));
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(normalize_optional(Some(" a ".to_string())), Some("a".to_string()));
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_amount_checks() {
        assert!(require_non_negative("deposit", 0).is_ok());
        assert!(require_non_negative("deposit", -1).is_err());
        assert!(require_positive("amount", 0).is_err());
        assert!(require_positive("amount", 1).is_ok());
    }
}
