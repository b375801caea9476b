//! 인증 마이크로서비스
//!
//! 로컬 계정 가입, 이메일/패스워드 로그인, 이메일 OTP 로그인, Google OAuth 2.0 로그인,
//! 액세스/리프레시 토큰 회전을 제공하는 actix-web 서비스입니다.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트, 인증 미들웨어
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청 검증, 쿠키, 상태 코드
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 세션 코어, 사용자 관리, OTP, Google OAuth
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CredentialStore │ ← MongoDB 또는 메모리 구현
//! └─────────────────┘
//! ```
//!
//! 서비스들은 시작 시 [`core::ServiceContainer`]로 한 번 조립되어
//! `web::Data`로 공유됩니다.

pub mod core;
pub mod config;
pub mod db;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;
