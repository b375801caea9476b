//! 에러 모듈
//!
//! 서비스 전역에서 공유하는 [`AppError`]와 [`AppResult`]를 노출합니다.

pub mod errors;

pub use errors::*;
