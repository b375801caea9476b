//! Google OAuth 2.0 어댑터
//!
//! 인증 URL 생성, 콜백 state 검증, Authorization Code 교환, 사용자 정보 조회까지만
//! 담당합니다. 계정을 찾거나 만드는 일은 세션 코어
//! ([`SessionService::handle_oauth_callback`](super::SessionService::handle_oauth_callback))가 합니다.
//!
//! # State 형식
//!
//! ```text
//! {nonce}.{issued_at}.{signature}
//!
//! nonce      16바이트 난수, base64url (패딩 없음)
//! issued_at  발급 시각 (Unix 초)
//! signature  HMAC-SHA256("{nonce}.{issued_at}"), base64url (패딩 없음)
//! ```
//!
//! 서버에 아무 상태도 남기지 않고, 콜백 시 서명과 유효 시간만 확인합니다.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use log::{info, warn};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::config::GoogleOAuthConfig;
use crate::domain::dto::users::response::GoogleLoginUrlResponse;
use crate::domain::models::oauth::{GoogleTokenResponse, GoogleUserInfo, OAuthPrincipal};
use crate::errors::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

const STATE_NONCE_BYTES: usize = 16;

pub struct GoogleAuthService {
    config: GoogleOAuthConfig,
    http: reqwest::Client,
}

impl GoogleAuthService {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GoogleOAuthConfig {
        &self.config
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(AppError::InternalError(
                "Google OAuth is not configured.".to_string(),
            ))
        }
    }

    /// Google 인증 페이지 URL과 서명된 state를 만듭니다.
    ///
    /// `access_type=offline`, `prompt=consent`로 요청해 프로바이더 리프레시 토큰을 받습니다.
    pub fn login_url(&self) -> AppResult<GoogleLoginUrlResponse> {
        self.ensure_configured()?;

        let state = sign_state(&self.config.state_secret, chrono::Utc::now().timestamp())?;

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", self.config.scope.as_str()),
            ("response_type", "code"),
            ("state", state.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(GoogleLoginUrlResponse {
            auth_url: format!("{}?{}", self.config.auth_uri, query_string),
            state,
        })
    }

    /// 콜백의 code/state를 검증된 신원으로 바꿉니다.
    pub async fn authenticate(&self, code: &str, state: &str) -> AppResult<OAuthPrincipal> {
        self.ensure_configured()?;

        if !verify_state(
            &self.config.state_secret,
            state,
            chrono::Utc::now().timestamp(),
            self.config.state_ttl_minutes * 60,
        ) {
            warn!("🚫 OAuth state 검증 실패");
            return Err(AppError::AuthenticationError(
                "Invalid OAuth state.".to_string(),
            ));
        }

        if code.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Authorization code is required.".to_string(),
            ));
        }

        let tokens = self.exchange_code(code).await?;
        let info = self.fetch_user_info(&tokens.access_token).await?;

        info!("🔑 Google 사용자 정보 조회 완료 (id: {})", info.id);
        Ok(OAuthPrincipal::from_google(info, &tokens))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<GoogleTokenResponse> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 토큰 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google 토큰 교환 실패 ({}): {}", status, error_text);
            return Err(AppError::ExternalServiceError(
                "Failed to exchange authorization code.".to_string(),
            ));
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 토큰 응답 파싱 실패: {}", e)))
    }

    async fn fetch_user_info(&self, access_token: &str) -> AppResult<GoogleUserInfo> {
        let response = self
            .http
            .get(&self.config.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Google 사용자 정보 요청 실패: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google 사용자 정보 조회 실패 ({}): {}", status, error_text);
            return Err(AppError::ExternalServiceError(
                "Failed to fetch Google user info.".to_string(),
            ));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Google 사용자 정보 파싱 실패: {}", e)))
    }
}

fn state_mac(secret: &str, payload: &str) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::InternalError(format!("HMAC 초기화 실패: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

pub(crate) fn sign_state(secret: &str, issued_at: i64) -> AppResult<String> {
    let mut nonce = [0u8; STATE_NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce);

    let payload = format!("{}.{}", URL_SAFE_NO_PAD.encode(nonce), issued_at);
    let signature = state_mac(secret, &payload)?.finalize().into_bytes();

    Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature)))
}

/// 서명이 맞고 `max_age_secs` 안에 발급된 state인지 확인합니다.
pub(crate) fn verify_state(secret: &str, state: &str, now: i64, max_age_secs: i64) -> bool {
    let parts: Vec<&str> = state.split('.').collect();
    let [nonce, issued_at, signature] = parts.as_slice() else {
        return false;
    };

    let Ok(issued_at_secs) = issued_at.parse::<i64>() else {
        return false;
    };
    if issued_at_secs > now || now - issued_at_secs > max_age_secs {
        return false;
    }

    let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
        return false;
    };

    let payload = format!("{}.{}", nonce, issued_at);
    match state_mac(secret, &payload) {
        Ok(mac) => mac.verify_slice(&signature).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "state-secret-for-tests";

    #[test]
    fn test_signed_state_verifies() {
        let state = sign_state(SECRET, 1_000).unwrap();
        assert_eq!(state.split('.').count(), 3);
        assert!(verify_state(SECRET, &state, 1_030, 600));
    }

    #[test]
    fn test_state_rejects_wrong_secret() {
        let state = sign_state(SECRET, 1_000).unwrap();
        assert!(!verify_state("another-secret", &state, 1_030, 600));
    }

    #[test]
    fn test_state_rejects_expired_and_future() {
        let state = sign_state(SECRET, 1_000).unwrap();
        assert!(!verify_state(SECRET, &state, 1_601, 600));
        assert!(!verify_state(SECRET, &state, 999, 600));
    }

    #[test]
    fn test_state_rejects_tampered_timestamp() {
        let state = sign_state(SECRET, 1_000).unwrap();
        let parts: Vec<&str> = state.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], 1_500, parts[2]);
        assert!(!verify_state(SECRET, &forged, 1_510, 600));
    }

    #[test]
    fn test_state_rejects_malformed() {
        assert!(!verify_state(SECRET, "", 0, 600));
        assert!(!verify_state(SECRET, "only.two", 0, 600));
        assert!(!verify_state(SECRET, "a.notanumber.c", 0, 600));
    }

    #[test]
    fn test_login_url_contains_offline_consent_params() {
        let mut config = GoogleOAuthConfig::default();
        config.client_id = "client-123".to_string();
        config.client_secret = "shh".to_string();
        config.redirect_uri = "http://localhost:8080/api/v1/auth/google/callback".to_string();
        config.state_secret = SECRET.to_string();

        let service = GoogleAuthService::new(config);
        let response = service.login_url().unwrap();

        assert!(response.auth_url.contains("client_id=client-123"));
        assert!(response.auth_url.contains("response_type=code"));
        assert!(response.auth_url.contains("access_type=offline"));
        assert!(response.auth_url.contains("prompt=consent"));
        assert!(response.auth_url.contains(&urlencoding::encode(&response.state).into_owned()));
    }
}
