//! # OAuth 사용자 리포지토리 구현
//!
//! `oauth_users` 컬렉션에 대한 MongoDB 데이터 액세스 계층입니다.

use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::domain::entities::{OAuthUser, StoredSession};
use crate::errors::{AppError, AppResult};
use crate::repositories::mongo_store::is_duplicate_key;
use crate::repositories::users::user_repo::session_update;

pub const OAUTH_USERS_COLLECTION: &str = "oauth_users";

#[derive(Clone)]
pub struct OAuthUserRepository {
    collection: Collection<OAuthUser>,
}

impl OAuthUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.get_database().collection::<OAuthUser>(OAUTH_USERS_COLLECTION),
        }
    }

    pub async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<OAuthUser>> {
        Ok(self.collection.find_one(doc! { "google_id": google_id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<OAuthUser>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    pub async fn find_by_refresh_token(&self, refresh_token: &str) -> AppResult<Option<OAuthUser>> {
        Ok(self
            .collection
            .find_one(doc! { "refresh_token": refresh_token })
            .await?)
    }

    pub async fn create(&self, user: &OAuthUser) -> AppResult<()> {
        self.collection.insert_one(user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::ConflictError("Google account already linked.".to_string())
            } else {
                AppError::DatabaseError(e.to_string())
            }
        })?;
        Ok(())
    }

    /// 프로필과 프로바이더 토큰만 `$set`으로 갱신합니다. 세션 필드는 바뀌지 않습니다.
    pub async fn update_profile(&self, user: &OAuthUser) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": user.id }, oauth_profile_update(user))
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn set_session(&self, id: i64, session: Option<StoredSession>) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, session_update(session))
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let google_id_index = IndexModel::builder()
            .keys(doc! { "google_id": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("google_id_unique".to_string())
                .build())
            .build();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .name("email_lookup".to_string())
                .build())
            .build();

        let refresh_token_index = IndexModel::builder()
            .keys(doc! { "refresh_token": 1 })
            .options(IndexOptions::builder()
                .name("refresh_token_lookup".to_string())
                .build())
            .build();

        self.collection
            .create_indexes([google_id_index, email_index, refresh_token_index])
            .await?;
        Ok(())
    }
}

/// OAuth 계정 프로필 `$set` 문서 (`google_id`와 세션 필드 제외)
pub(crate) fn oauth_profile_update(user: &OAuthUser) -> Document {
    doc! {
        "$set": {
            "email": &user.email,
            "username": &user.username,
            "role": user.role.as_str(),
            "provider_access_token": user.provider_access_token.clone(),
            "provider_refresh_token": user.provider_refresh_token.clone(),
            "updated_at": DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn test_oauth_profile_update_sets_provider_tokens_only() {
        let mut user = OAuthUser::new("g@example.com".into(), "g".into(), "gid-1".into(), Some("at".into()), None);
        user.refresh_token = Some("session".into());

        let update = oauth_profile_update(&user);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("provider_access_token").unwrap(), "at");
        assert_eq!(set.get("provider_refresh_token"), Some(&Bson::Null));
        assert!(!set.contains_key("refresh_token"));
        assert!(!set.contains_key("refresh_token_expiry"));
        assert!(!set.contains_key("google_id"));
    }
}
