//! 인증 및 보안 서비스 모듈
//!
//! - [`PasswordHasher`] - bcrypt 해시/검증
//! - [`TokenService`] - HS256 액세스 토큰, 불투명 리프레시 토큰
//! - [`RolePolicy`] - 허용 역할 목록
//! - [`SessionService`] - 로그인/갱신/로그아웃 세션 코어
//! - [`OtpService`] - OTP 발급
//! - [`GoogleAuthService`] - Google OAuth 2.0 어댑터
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::core::ServiceContainer;
//!
//! let pair = container.sessions.login("vinay@test.com", "Vinay@123").await?;
//! let rotated = container.sessions.refresh_tokens(&pair.refresh_token).await?;
//! ```

pub mod password_hasher;
pub mod token_service;
pub mod role_policy;
pub mod session_service;
pub mod otp_service;
pub mod google_auth_service;

pub use password_hasher::*;
pub use token_service::*;
pub use role_policy::*;
pub use session_service::*;
pub use otp_service::*;
pub use google_auth_service::*;
