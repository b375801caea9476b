//! # 문자열 유틸리티
//!
//! 입력값 정리와 로그용 마스킹 함수들입니다.

use serde::Deserialize;

use crate::errors::AppError;

/// 필수 문자열 검증 및 정리
///
/// 앞뒤 공백을 제거한 값이 비어 있으면 `ValidationError`를 반환합니다.
///
/// # Examples
///
/// ```rust,ignore
/// let email = validate_required_string(&payload.email, "Email")?;
/// ```
pub fn validate_required_string(value: &str, field_name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{} is required.", field_name)));
    }
    Ok(trimmed.to_string())
}

/// 선택적 문자열 정리 (빈 문자열이면 `None`)
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// 이메일 정규화 (공백 제거 + 소문자)
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 로그 출력용 이메일 마스킹
///
/// 로컬 파트의 첫 글자만 남깁니다. `vinay@example.com` → `v***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

/// Serde용 선택적 문자열 역직렬화 함수
///
/// 공백만 있는 문자열은 `None`으로 처리합니다.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(clean_optional_string(opt))
}
