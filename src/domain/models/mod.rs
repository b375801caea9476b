//! 도메인 모델
//!
//! 영속되지 않는 값 객체들: 토큰 클레임, 인증 컨텍스트, Google OAuth 응답.

pub mod auth;
pub mod token;
pub mod oauth;

pub use auth::*;
pub use token::*;
pub use oauth::*;
