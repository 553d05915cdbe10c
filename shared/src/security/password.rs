//! Password hashing and verification helper module

use crate::security::SecurityError;
use bcrypt::{hash, verify};

/// Hash a password using bcrypt with the given cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, SecurityError> {
    hash(password, cost).map_err(|e| SecurityError::InvalidInput(format!("hash failed: {e}")))
}

/// Verify a password against a hash
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    verify(password, hashed).unwrap_or(false)
}

/// Validate password strength
pub fn validate_password_strength(password: &str) -> Result<(), SecurityError> {
    if password.chars().count() < 8 {
        return Err(SecurityError::InvalidInput(
            "비밀번호는 8자 이상이어야 합니다".to_string(),
        ));
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_uppercase || !has_lowercase || !has_digit {
        return Err(SecurityError::InvalidInput(
            "비밀번호는 대문자, 소문자, 숫자를 모두 포함해야 합니다".to_string(),
        ));
    }

    if password.chars().count() >= 12 && !has_special {
        // 12자 이상은 특수문자 필수
        return Err(SecurityError::InvalidInput(
            "12자 이상의 비밀번호는 특수문자를 포함해야 합니다".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "SecurePass123!";
        // 테스트 속도를 위해 최소 cost 사용
        let hashed = hash_password(password, 4).expect("Failed to hash password");

        assert_ne!(password, hashed);
        assert!(verify_password(password, &hashed));
        assert!(!verify_password("WrongPass", &hashed));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("Pass1!").is_err());
        assert!(validate_password_strength("password123").is_err());
        assert!(validate_password_strength("PASSWORD123").is_err());
        assert!(validate_password_strength("Password!").is_err());
        assert!(validate_password_strength("Password123").is_ok());
        assert!(validate_password_strength("VeryLongPassword123").is_err());
        assert!(validate_password_strength("VeryLongPassword123!").is_ok());
    }
}
