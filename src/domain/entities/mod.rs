//! 영속 엔티티
//!
//! MongoDB 컬렉션 `users`, `oauth_users`, `user_otps`에 그대로 저장되는 구조체들입니다.

pub mod users;
pub mod otp;

pub use users::*;
pub use otp::*;

use mongodb::bson::DateTime;

/// 계정에 저장되는 리프레시 토큰 세션
///
/// 토큰 값과 만료 시각은 항상 함께 존재하거나 함께 비어 있습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub refresh_token: String,
    pub expires_at: DateTime,
}

impl StoredSession {
    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expires_at < now
    }
}
