//! 인증 요청 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 이메일/패스워드 로그인 요청
///
/// 빈 값 검사는 세션 코어가 수행하므로 여기서는 형식만 받습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// OTP 발송 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSendRequest {
    #[serde(default)]
    pub email: String,
}

/// OTP 검증 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerifyRequest {
    #[serde(default)]
    pub email: String,
    pub code: u32,
}

/// Google OAuth 콜백 쿼리
///
/// 사용자가 동의를 거부하면 `code` 대신 `error`가 전달됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OAuthCallbackQuery {
    #[validate(length(min = 1, message = "Authorization code is required."))]
    #[serde(default)]
    pub code: String,
    #[validate(length(min = 1, message = "State is required."))]
    #[serde(default)]
    pub state: String,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// 본문으로 전달되는 리프레시 토큰 (쿠키가 없을 때의 대안)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}
