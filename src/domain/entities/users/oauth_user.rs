//! OAuth User Entity Implementation
//!
//! Google 계정으로 로그인한 사용자 엔티티입니다. 로컬 계정과는 별도 컬렉션에 저장됩니다.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Role, StoredSession};

/// OAuth 사용자 엔티티
///
/// `provider_*` 필드는 Google이 발급한 토큰이며 이 서비스의 자격 증명으로 받아들이지 않습니다.
/// 이 서비스의 세션은 `refresh_token` / `refresh_token_expiry`에만 저장됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthUser {
    #[serde(rename = "_id")]
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
    /// Google 계정 고유 ID (unique, 불변)
    pub google_id: String,
    #[serde(default)]
    pub provider_access_token: Option<String>,
    #[serde(default)]
    pub provider_refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_token_expiry: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl OAuthUser {
    pub fn new(
        email: String,
        username: String,
        google_id: String,
        provider_access_token: Option<String>,
        provider_refresh_token: Option<String>,
    ) -> Self {
        let now = DateTime::now();

        Self {
            id: 0,
            email,
            username,
            role: Role::User,
            google_id,
            provider_access_token,
            provider_refresh_token,
            refresh_token: None,
            refresh_token_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session(&self) -> Option<StoredSession> {
        match (&self.refresh_token, self.refresh_token_expiry) {
            (Some(token), Some(expires_at)) => Some(StoredSession {
                refresh_token: token.clone(),
                expires_at,
            }),
            _ => None,
        }
    }

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

    /// Google이 새로 내려준 프로바이더 토큰으로 교체
    ///
    /// 리프레시 토큰은 최초 동의 시에만 내려오므로, 없으면 기존 값을 유지합니다.
    pub fn refresh_provider_tokens(&mut self, access_token: Option<String>, refresh_token: Option<String>) {
        self.provider_access_token = access_token;
        if refresh_token.is_some() {
            self.provider_refresh_token = refresh_token;
        }
        self.updated_at = DateTime::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_oauth_user_defaults_to_user_role() {
        let user = OAuthUser::new("g@example.com".into(), "g".into(), "gid-1".into(), Some("at".into()), None);
        assert_eq!(user.role, Role::User);
        assert!(user.session().is_none());
    }

    #[test]
    fn test_refresh_provider_tokens_keeps_existing_refresh() {
        let mut user = OAuthUser::new("g@example.com".into(), "g".into(), "gid-1".into(), Some("at1".into()), Some("rt1".into()));
        user.refresh_provider_tokens(Some("at2".into()), None);
        assert_eq!(user.provider_access_token.as_deref(), Some("at2"));
        assert_eq!(user.provider_refresh_token.as_deref(), Some("rt1"));
    }
}
