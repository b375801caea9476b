//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스들은 시작 시 한 번 만들어져 [`crate::core::ServiceContainer`]에 담기고,
//! 핸들러는 `web::Data<ServiceContainer>`로 받아 사용합니다.
//!
//! - [`users`] - 계정 생명주기
//! - [`auth`] - 토큰, 세션, OTP, Google OAuth
//! - [`email`] - OTP 메일 발송

pub mod users;
pub mod auth;
pub mod email;
