//! Google OAuth 응답 모델
//!
//! 토큰 엔드포인트 / userinfo 엔드포인트 응답과, 세션 코어로 넘겨지는
//! 프로바이더 중립적인 [`OAuthPrincipal`]을 정의합니다.

use serde::{Deserialize, Serialize};

/// Google 토큰 엔드포인트 응답
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Google userinfo (v2) 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified_email: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// 외부 인증 제공자가 확인해 준 신원
///
/// 세션 코어는 이 값만 보고 OAuth 계정을 찾거나 만듭니다.
#[derive(Debug, Clone, Default)]
pub struct OAuthPrincipal {
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// 프로바이더 측 사용자 ID (Google `id`)
    pub provider_user_id: Option<String>,
    pub provider_access_token: Option<String>,
    pub provider_refresh_token: Option<String>,
}

impl OAuthPrincipal {
    pub fn from_google(info: GoogleUserInfo, tokens: &GoogleTokenResponse) -> Self {
        Self {
            email: info.email,
            display_name: info.name,
            provider_user_id: Some(info.id),
            provider_access_token: Some(tokens.access_token.clone()),
            provider_refresh_token: tokens.refresh_token.clone(),
        }
    }
}
