//! # Configuration Module
//!
//! 인증 서비스의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 시작 시 한 번 읽어 [`AppConfig`]로 묶고,
//! 이후에는 불변 값으로만 전달합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 데이터베이스, 서버, 환경, 패스워드 해싱 설정
//! - [`auth_config`] - JWT, OTP, Google OAuth, SMTP, 관리자 시드 설정
//!
//! ## 환경 분리
//!
//! 개발, 테스트, 스테이징, 프로덕션 환경별로 다른 기본값을 제공합니다.
//! 프로덕션에서는 `JWT_SECRET`, `OAUTH_STATE_SECRET` 누락 시 시작이 실패합니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! println!("Server will bind to {}", config.server.bind_address());
//! ```

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;

use crate::errors::AppResult;

/// 애플리케이션 전체 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub password: PasswordConfig,
    pub database: DatabaseConfig,
    pub auth: AuthSettings,
    pub otp: OtpConfig,
    pub google: GoogleOAuthConfig,
    /// 없으면 콘솔 발송기 사용
    pub smtp: Option<SmtpConfig>,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    /// 모든 설정을 환경 변수에서 읽습니다.
    pub fn from_env() -> AppResult<Self> {
        let environment = Environment::current();

        Ok(Self {
            server: ServerConfig::from_env(),
            password: PasswordConfig::from_env(&environment),
            database: DatabaseConfig::from_env(),
            auth: AuthSettings::from_env(&environment)?,
            otp: OtpConfig::from_env(),
            google: GoogleOAuthConfig::from_env(&environment)?,
            smtp: SmtpConfig::from_env(),
            admin_seed: AdminSeed::from_env(),
            environment,
        })
    }
}
