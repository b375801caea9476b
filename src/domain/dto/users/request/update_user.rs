//! 사용자 수정 요청 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::dto::users::request::create_user::{validate_password_strength, validate_username};
use crate::utils::string_utils::deserialize_optional_string;

/// 관리자용 프로필 수정 요청
///
/// `password`와 `role`은 선택입니다. 비어 있으면 기존 값을 유지합니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters."))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(email(message = "A valid email address is required."))]
    pub email: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub role: Option<String>,
}

/// 역할 변경 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_password_is_checked_only_when_present() {
        let without = UpdateUserRequest {
            username: "vinay".into(),
            email: "vinay@example.com".into(),
            password: None,
            role: None,
        };
        assert!(without.validate().is_ok());

        let weak = UpdateUserRequest {
            password: Some("weak".into()),
            ..without
        };
        assert!(weak.validate().is_err());
    }
}
