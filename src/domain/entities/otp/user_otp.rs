//! OTP Record Entity
//!
//! 이메일로 발송된 일회용 로그인 코드입니다. `is_used`는 false에서 true로만 바뀝니다.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OtpRecord {
    /// UUID v4 문자열
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub code: u32,
    pub expiry_at: DateTime,
    pub created_at: DateTime,
    #[serde(default)]
    pub is_used: bool,
}

impl OtpRecord {
    pub fn new(email: String, code: u32, ttl_minutes: i64) -> Self {
        let now = DateTime::now();
        let expiry_at = DateTime::from_millis(now.timestamp_millis() + ttl_minutes * 60_000);

        Self {
            id: Uuid::new_v4().to_string(),
            email,
            code,
            expiry_at,
            created_at: now,
            is_used: false,
        }
    }

    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expiry_at < now
    }
}
