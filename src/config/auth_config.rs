//! # Authentication Configuration Module
//!
//! JWT 토큰, OTP, Google OAuth, SMTP, 초기 관리자 계정 등 인증 관련 설정을 관리합니다.
//! 모든 설정은 시작 시 환경 변수에서 한 번 읽혀 불변 구조체가 되고,
//! 세션 코어에는 생성 시점에 명시적으로 전달됩니다.
//!
//! ## 필수 환경 변수 설정
//!
//! ### JWT 토큰 설정
//! ```bash
//! export JWT_SECRET="your-super-secret-jwt-key"
//! export JWT_ISSUER="auth-microservice"
//! export JWT_AUDIENCE="auth-microservice-clients"
//! export JWT_ACCESS_TTL_MINUTES="60"
//! export JWT_OTP_ACCESS_TTL_MINUTES="1440"
//! export JWT_OAUTH_ACCESS_TTL_MINUTES="60"
//! export REFRESH_TOKEN_TTL_DAYS="7"
//! ```
//!
//! ### Google OAuth 설정
//! ```bash
//! export GOOGLE_CLIENT_ID="your-google-client-id"
//! export GOOGLE_CLIENT_SECRET="your-google-client-secret"
//! export GOOGLE_REDIRECT_URI="http://localhost:8080/api/v1/auth/google/callback"
//! export OAUTH_STATE_SECRET="your-oauth-state-secret"
//! export OAUTH_SUCCESS_REDIRECT="http://localhost:3000/Dashboard?googleLogin=true"
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::AuthSettings;
//! use crate::domain::models::token::LoginMethod;
//!
//! let settings = AuthSettings::from_env(&Environment::current())?;
//! let ttl = settings.access_ttl_for(LoginMethod::Otp);
//! ```

use chrono::Duration;
use log::warn;

use crate::config::data_config::{non_empty_var, parse_var, Environment};
use crate::domain::models::token::LoginMethod;
use crate::errors::{AppError, AppResult};

const DEV_JWT_SECRET: &str = "dev-only-jwt-secret-change-me";
const DEV_STATE_SECRET: &str = "dev-only-oauth-state-secret-change-me";

/// 토큰 발급 정책
///
/// 서명 비밀키, 발급자/대상, 로그인 방식별 액세스 토큰 수명, 리프레시 토큰 수명과
/// 세션 정책 플래그를 담습니다.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HS256 서명 비밀키
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    /// 패스워드 로그인 및 토큰 갱신 시 액세스 토큰 수명
    pub access_ttl: Duration,
    /// OTP 로그인 시 액세스 토큰 수명
    pub otp_access_ttl: Duration,
    /// Google OAuth 로그인 시 액세스 토큰 수명
    pub oauth_access_ttl: Duration,
    /// 리프레시 토큰 수명
    pub refresh_ttl: Duration,
    /// OTP 로그인 시 이미 세션을 보유한 계정을 거부할지 여부
    pub otp_single_active_session: bool,
    /// OAuth 콜백에서도 리프레시 토큰을 발급할지 여부
    pub oauth_issue_refresh_token: bool,
}

impl AuthSettings {
    /// 환경 변수에서 토큰 정책을 읽습니다.
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 프로덕션 환경에서 `JWT_SECRET`이 없는 경우
    pub fn from_env(environment: &Environment) -> AppResult<Self> {
        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                return Err(AppError::InternalError(
                    "프로덕션 환경에서는 JWT_SECRET 환경 변수가 필수입니다".to_string(),
                ));
            }
            None => {
                warn!("⚠️ JWT_SECRET 미설정: 개발용 기본 비밀키를 사용합니다");
                DEV_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            jwt_secret,
            issuer: non_empty_var("JWT_ISSUER").unwrap_or_else(|| "auth-microservice".to_string()),
            audience: non_empty_var("JWT_AUDIENCE")
                .unwrap_or_else(|| "auth-microservice-clients".to_string()),
            access_ttl: Duration::minutes(parse_var("JWT_ACCESS_TTL_MINUTES", 60i64)),
            otp_access_ttl: Duration::minutes(parse_var("JWT_OTP_ACCESS_TTL_MINUTES", 1440i64)),
            oauth_access_ttl: Duration::minutes(parse_var("JWT_OAUTH_ACCESS_TTL_MINUTES", 60i64)),
            refresh_ttl: Duration::days(parse_var("REFRESH_TOKEN_TTL_DAYS", 7i64)),
            otp_single_active_session: parse_var("OTP_SINGLE_ACTIVE_SESSION", true),
            oauth_issue_refresh_token: parse_var("OAUTH_ISSUE_REFRESH_TOKEN", false),
        })
    }

    /// 주어진 비밀키와 기본 정책으로 설정을 만듭니다.
    pub fn with_secret(secret: &str) -> Self {
        Self {
            jwt_secret: secret.to_string(),
            issuer: "auth-microservice".to_string(),
            audience: "auth-microservice-clients".to_string(),
            access_ttl: Duration::minutes(60),
            otp_access_ttl: Duration::minutes(1440),
            oauth_access_ttl: Duration::minutes(60),
            refresh_ttl: Duration::days(7),
            otp_single_active_session: true,
            oauth_issue_refresh_token: false,
        }
    }

    /// 로그인 방식별 액세스 토큰 수명
    pub fn access_ttl_for(&self, method: LoginMethod) -> Duration {
        match method {
            LoginMethod::Password | LoginMethod::Refresh => self.access_ttl,
            LoginMethod::Otp => self.otp_access_ttl,
            LoginMethod::OAuth => self.oauth_access_ttl,
        }
    }
}

/// OTP 발급 설정
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// OTP 유효 시간 (분)
    pub ttl_minutes: i64,
    /// OTP 자릿수 (4-9)
    pub digits: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 5,
            digits: 6,
        }
    }
}

impl OtpConfig {
    /// `OTP_TTL_MINUTES`, `OTP_DIGITS`를 읽습니다. 자릿수는 4-9 범위로 제한됩니다.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_minutes: parse_var("OTP_TTL_MINUTES", defaults.ttl_minutes).max(1),
            digits: parse_var("OTP_DIGITS", defaults.digits).clamp(4, 9),
        }
    }
}

/// Google OAuth 2.0 설정
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Google Cloud Console에 등록된 콜백 URI
    pub redirect_uri: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub userinfo_uri: String,
    /// 요청할 OAuth 스코프 (공백 구분)
    pub scope: String,
    /// `state` 파라미터 HMAC 서명 비밀키
    pub state_secret: String,
    /// `state` 파라미터 유효 시간 (분)
    pub state_ttl_minutes: i64,
    /// 콜백 성공 후 브라우저를 보낼 프론트엔드 주소
    pub success_redirect: String,
}

impl GoogleOAuthConfig {
    /// # Errors
    ///
    /// * `AppError::InternalError` - 프로덕션 환경에서 `OAUTH_STATE_SECRET`이 없는 경우
    pub fn from_env(environment: &Environment) -> AppResult<Self> {
        let state_secret = match non_empty_var("OAUTH_STATE_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                return Err(AppError::InternalError(
                    "프로덕션 환경에서는 OAUTH_STATE_SECRET 환경 변수가 필수입니다".to_string(),
                ));
            }
            None => DEV_STATE_SECRET.to_string(),
        };

        let defaults = Self::default();

        Ok(Self {
            client_id: non_empty_var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: non_empty_var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: non_empty_var("GOOGLE_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            auth_uri: non_empty_var("GOOGLE_AUTH_URI").unwrap_or(defaults.auth_uri),
            token_uri: non_empty_var("GOOGLE_TOKEN_URI").unwrap_or(defaults.token_uri),
            userinfo_uri: non_empty_var("GOOGLE_USERINFO_URI").unwrap_or(defaults.userinfo_uri),
            scope: non_empty_var("GOOGLE_SCOPE").unwrap_or(defaults.scope),
            state_secret,
            state_ttl_minutes: parse_var("OAUTH_STATE_TTL_MINUTES", defaults.state_ttl_minutes),
            success_redirect: non_empty_var("OAUTH_SUCCESS_REDIRECT")
                .unwrap_or(defaults.success_redirect),
        })
    }

    /// 클라이언트 ID/시크릿이 모두 설정되어 있는지 확인
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl Default for GoogleOAuthConfig {
    /// 자격 증명이 비어 있는 (미설정) 구성
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/api/v1/auth/google/callback".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_uri: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            scope: "openid email profile".to_string(),
            state_secret: DEV_STATE_SECRET.to_string(),
            state_ttl_minutes: 10,
            success_redirect: "http://localhost:3000/Dashboard?googleLogin=true".to_string(),
        }
    }
}

/// SMTP 발송 설정
///
/// `SMTP_HOST`가 없으면 `None`이 되고 콘솔 발송기가 사용됩니다.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl SmtpConfig {
    pub fn from_env() -> Option<Self> {
        let host = non_empty_var("SMTP_HOST")?;
        let username = non_empty_var("SMTP_USERNAME").unwrap_or_default();

        Some(Self {
            host,
            port: parse_var("SMTP_PORT", 587u16),
            from_email: non_empty_var("SMTP_FROM_EMAIL").unwrap_or_else(|| username.clone()),
            username,
            password: non_empty_var("SMTP_PASSWORD").unwrap_or_default(),
            from_name: non_empty_var("SMTP_FROM_NAME").unwrap_or_else(|| "Auth Service".to_string()),
        })
    }
}

/// 초기 관리자 계정 정보
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminSeed {
    /// 세 값이 모두 설정된 경우에만 `Some`을 반환합니다.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            username: non_empty_var("ADMIN_SEED_USERNAME")?,
            email: non_empty_var("ADMIN_SEED_EMAIL")?,
            password: non_empty_var("ADMIN_SEED_PASSWORD")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls_per_login_method() {
        let settings = AuthSettings::with_secret("secret");

        assert_eq!(settings.access_ttl_for(LoginMethod::Password), Duration::minutes(60));
        assert_eq!(settings.access_ttl_for(LoginMethod::Refresh), Duration::minutes(60));
        assert_eq!(settings.access_ttl_for(LoginMethod::OAuth), Duration::minutes(60));
        assert_eq!(settings.access_ttl_for(LoginMethod::Otp), Duration::days(1));
        assert_eq!(settings.refresh_ttl, Duration::days(7));
    }

    #[test]
    fn test_default_session_flags() {
        let settings = AuthSettings::with_secret("secret");
        assert!(settings.otp_single_active_session);
        assert!(!settings.oauth_issue_refresh_token);
    }

    #[test]
    fn test_otp_config_defaults() {
        let config = OtpConfig::default();
        assert_eq!(config.ttl_minutes, 5);
        assert_eq!(config.digits, 6);
    }
}
