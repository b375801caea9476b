//! 역할 정책
//!
//! 회원가입, 프로필 수정, 역할 변경이 모두 이 한 곳을 거쳐 역할 값을 검증합니다.

use crate::domain::entities::Role;
use crate::errors::{AppError, AppResult};

pub struct RolePolicy;

impl RolePolicy {
    pub fn allowed() -> &'static [Role] {
        &Role::ALL
    }

    /// 필수 역할 값 검증 (공백 또는 집합 밖의 값은 거부)
    pub fn parse(raw: &str) -> AppResult<Role> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::ValidationError("Role is required.".to_string()));
        }

        trimmed.parse::<Role>().map_err(|_| {
            let allowed = Self::allowed()
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            AppError::ValidationError(format!("Invalid role. Allowed roles: {}.", allowed))
        })
    }

    /// 선택 역할 값 검증. 없으면 기본 역할 `User`.
    pub fn resolve_optional(raw: Option<&str>) -> AppResult<Role> {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(role) => Self::parse(role),
            None => Ok(Role::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_closed_set() {
        assert_eq!(RolePolicy::parse("Operator").unwrap(), Role::Operator);
        assert_eq!(RolePolicy::parse(" Manager ").unwrap(), Role::Manager);
    }

    #[test]
    fn test_parse_rejects_blank_and_unknown() {
        assert!(matches!(RolePolicy::parse("  "), Err(AppError::ValidationError(_))));
        assert!(matches!(RolePolicy::parse("root"), Err(AppError::ValidationError(_))));
        assert!(matches!(RolePolicy::parse("admin"), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_resolve_optional_defaults_to_user() {
        assert_eq!(RolePolicy::resolve_optional(None).unwrap(), Role::User);
        assert_eq!(RolePolicy::resolve_optional(Some("")).unwrap(), Role::User);
        assert_eq!(RolePolicy::resolve_optional(Some("Admin")).unwrap(), Role::Admin);
        assert!(RolePolicy::resolve_optional(Some("Guest")).is_err());
    }
}
