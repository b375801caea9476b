//! 사용자 관리 서비스 모듈
//!
//! 로컬 계정 가입, 관리자용 조회/수정/삭제, 역할 변경, 온보딩 투어 상태를 다룹니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::domain::dto::users::request::CreateUserRequest;
//!
//! let created = container.users.register(request).await?;
//! container.users.update_role(created.id, "Manager").await?;
//! ```

pub mod user_service;

pub use user_service::*;
