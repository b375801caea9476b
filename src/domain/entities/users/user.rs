//! User Entity Implementation
//!
//! 이메일/패스워드로 가입한 로컬 계정 엔티티입니다.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Role, StoredSession};

/// 로컬 사용자 엔티티
///
/// `refresh_token`과 `refresh_token_expiry`는 [`User::apply_session`]을 통해서만
/// 함께 갱신됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// 정수 ID (`counters` 컬렉션에서 발급)
    #[serde(rename = "_id")]
    pub id: i64,
    /// 사용자명 (unique)
    pub username: String,
    /// 사용자 이메일 (unique)
    pub email: String,
    /// bcrypt 해시
    pub password_hash: String,
    pub role: Role,
    /// 현재 유효한 단 하나의 리프레시 토큰
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_token_expiry: Option<DateTime>,
    /// 온보딩 투어 완료 여부
    #[serde(default)]
    pub tour_completed: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// 새 로컬 사용자 생성
    ///
    /// ID는 저장소가 삽입 시점에 채웁니다.
    pub fn new_local(username: String, email: String, password_hash: String, role: Role) -> Self {
        let now = DateTime::now();

        Self {
            id: 0,
            username,
            email,
            password_hash,
            role,
            refresh_token: None,
            refresh_token_expiry: None,
            tour_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// 저장된 세션 (토큰과 만료 시각이 모두 있을 때만)
    pub fn session(&self) -> Option<StoredSession> {
        match (&self.refresh_token, self.refresh_token_expiry) {
            (Some(token), Some(expires_at)) => Some(StoredSession {
                refresh_token: token.clone(),
                expires_at,
            }),
            _ => None,
        }
    }

    /// 세션을 덮어쓰거나 (`None`이면) 비웁니다.
    pub fn apply_session(&mut self, session: Option<StoredSession>) {
        match session {
            Some(s) => {
                self.refresh_token = Some(s.refresh_token);
                self.refresh_token_expiry = Some(s.expires_at);
            }
            None => {
                self.refresh_token = None;
                self.refresh_token_expiry = None;
            }
        }
        self.updated_at = DateTime::now();
    }

    /// 리프레시 토큰을 보유하고 있는지 확인
    pub fn has_active_session(&self) -> bool {
        self.refresh_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_local_has_no_session() {
        let user = User::new_local("vinay".into(), "vinay@example.com".into(), "hash".into(), Role::User);
        assert!(!user.has_active_session());
        assert!(user.session().is_none());
        assert!(!user.tour_completed);
    }

    #[test]
    fn test_apply_session_sets_and_clears_both_fields() {
        let mut user = User::new_local("vinay".into(), "vinay@example.com".into(), "hash".into(), Role::User);
        let expires_at = DateTime::from_millis(DateTime::now().timestamp_millis() + 60_000);

        user.apply_session(Some(StoredSession {
            refresh_token: "abc".into(),
            expires_at,
        }));
        assert_eq!(user.refresh_token.as_deref(), Some("abc"));
        assert_eq!(user.refresh_token_expiry, Some(expires_at));

        user.apply_session(None);
        assert!(user.refresh_token.is_none());
        assert!(user.refresh_token_expiry.is_none());
    }
}
