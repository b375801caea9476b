//! # Core Module
//!
//! 애플리케이션 조립을 담당합니다.
//!
//! - [`container`] - 서비스 그래프를 담는 [`ServiceContainer`]

pub mod container;

pub use container::*;
