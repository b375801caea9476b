//! # 사용자 생성 요청 DTO
//!
//! 회원가입 요청의 형식 검증 규칙을 정의합니다. 중복 확인과 역할 검증은
//! 서비스 계층에서 수행합니다.
//!
//! ## 검증 규칙
//!
//! - `username`: 3-20자, 영문/숫자/마침표/언더스코어
//! - `email`: 이메일 형식
//! - `password`: 8자 이상, 대문자/소문자/숫자/특수문자 각 1개 이상, 공백 불가
//! - `role`: 선택, 생략 시 `User`

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::string_utils::deserialize_optional_string;

/// 회원가입 요청 DTO
///
/// ```json
/// {
///   "username": "vinay",
///   "email": "vinay@example.com",
///   "password": "Secure@123",
///   "role": "Engineer"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters."))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(email(message = "A valid email address is required."))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub role: Option<String>,
}

/// 사용자명 허용 문자 검증 (영문, 숫자, `.`, `_`)
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return Err(ValidationError::new("invalid_username").with_message(
            "Username may only contain letters, digits, dots and underscores.".into(),
        ));
    }
    Ok(())
}

/// 비밀번호 강도 검증
///
/// 대문자, 소문자, 숫자, 특수문자를 각각 하나 이상 포함하고 공백이 없어야 합니다.
pub(crate) fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("password_whitespace")
            .with_message("Password must not contain spaces.".into()));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(ValidationError::new("weak_password").with_message(
            "Password must contain an uppercase letter, a lowercase letter, a digit and a special character."
                .into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("vinay.k_1", "vinay@example.com", "Secure@123").validate().is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert!(request("ab", "vinay@example.com", "Secure@123").validate().is_err());
        assert!(request("user-name", "vinay@example.com", "Secure@123").validate().is_err());
        assert!(request("a".repeat(21).as_str(), "vinay@example.com", "Secure@123").validate().is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password_strength("Secure@123").is_ok());
        assert!(validate_password_strength("secure@123").is_err());
        assert!(validate_password_strength("SECURE@123").is_err());
        assert!(validate_password_strength("Secure@abc").is_err());
        assert!(validate_password_strength("Secure1234").is_err());
        assert!(validate_password_strength("Secure @123").is_err());
    }

    #[test]
    fn test_invalid_email() {
        assert!(request("vinay", "not-an-email", "Secure@123").validate().is_err());
    }

    #[test]
    fn test_blank_role_deserializes_as_none() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"username":"vinay","email":"vinay@example.com","password":"Secure@123","role":"  "}"#,
        )
        .unwrap();
        assert!(req.role.is_none());
    }
}
