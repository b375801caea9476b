//! # Domain Layer Module
//!
//! 인증 서비스의 도메인 계층입니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Entities  - 영속 객체 (User, OAuthUser, OtpRecord)
//! ├── DTOs      - 요청/응답 계약
//! └── Models    - 토큰 클레임, 인증 컨텍스트, Google 응답 모델
//! ```

pub mod entities;
pub mod dto;
pub mod models;

pub use entities::*;
pub use dto::*;
pub use models::*;
