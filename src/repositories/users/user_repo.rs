//! # 사용자 리포지토리 구현
//!
//! `users` 컬렉션에 대한 MongoDB 데이터 액세스 계층입니다.
//!
//! ## 인덱스
//!
//! - `email` (unique)
//! - `username` (unique)
//! - `refresh_token` (리프레시 토큰 소유자 조회)

use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime, Document};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::domain::entities::{Role, StoredSession, User};
use crate::errors::{AppError, AppResult};
use crate::repositories::mongo_store::is_duplicate_key;

pub const USERS_COLLECTION: &str = "users";

/// 로컬 사용자 데이터 액세스 리포지토리
#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.get_database().collection::<User>(USERS_COLLECTION),
        }
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    pub async fn find_by_refresh_token(&self, refresh_token: &str) -> AppResult<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "refresh_token": refresh_token })
            .await?)
    }

    /// 필드 값이 존재하는지 확인합니다. `exclude_id`의 문서는 제외됩니다.
    pub async fn exists(&self, field: &str, value: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let mut filter = Document::new();
        filter.insert(field, value);
        if let Some(id) = exclude_id {
            filter.insert("_id", doc! { "$ne": id });
        }

        let count = self.collection.count_documents(filter).limit(1).await?;
        Ok(count > 0)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    /// ID가 이미 채워진 사용자를 저장합니다.
    pub async fn create(&self, user: &User) -> AppResult<()> {
        self.collection
            .insert_one(user)
            .await
            .map_err(Self::map_write_error)?;
        Ok(())
    }

    /// 프로필 필드만 `$set`으로 갱신합니다. 세션 필드는 바뀌지 않습니다.
    pub async fn update_profile(&self, user: &User) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": user.id }, profile_update(user))
            .await
            .map_err(Self::map_write_error)?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn any_with_role(&self, role: Role) -> AppResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "role": role.as_str() })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    pub async fn set_session(&self, id: i64, session: Option<StoredSession>) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, session_update(session))
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build())
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("username_unique".to_string())
                .build())
            .build();

        let refresh_token_index = IndexModel::builder()
            .keys(doc! { "refresh_token": 1 })
            .options(IndexOptions::builder()
                .name("refresh_token_lookup".to_string())
                .build())
            .build();

        self.collection
            .create_indexes([email_index, username_index, refresh_token_index])
            .await?;
        Ok(())
    }

    fn map_write_error(e: mongodb::error::Error) -> AppError {
        if is_duplicate_key(&e) {
            let message = e.to_string();
            if message.contains("username") {
                AppError::ConflictError("Username already exists.".to_string())
            } else {
                AppError::ConflictError("Email already exists.".to_string())
            }
        } else {
            AppError::DatabaseError(e.to_string())
        }
    }
}

/// 로컬 계정 프로필 `$set` 문서 (`refresh_token`, `refresh_token_expiry` 제외)
pub(crate) fn profile_update(user: &User) -> Document {
    doc! {
        "$set": {
            "username": &user.username,
            "email": &user.email,
            "password_hash": &user.password_hash,
            "role": user.role.as_str(),
            "tour_completed": user.tour_completed,
            "updated_at": DateTime::now(),
        }
    }
}

/// 리프레시 토큰과 만료 시각을 함께 덮어쓰는 `$set` 문서
pub(crate) fn session_update(session: Option<StoredSession>) -> Document {
    let (token, expiry) = match session {
        Some(s) => (Bson::String(s.refresh_token), Bson::DateTime(s.expires_at)),
        None => (Bson::Null, Bson::Null),
    };

    doc! {
        "$set": {
            "refresh_token": token,
            "refresh_token_expiry": expiry,
            "updated_at": DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_update_sets_both_fields() {
        let expires_at = DateTime::from_millis(1_700_000_000_000);
        let update = session_update(Some(StoredSession {
            refresh_token: "tok".into(),
            expires_at,
        }));
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("refresh_token").unwrap(), "tok");
        assert_eq!(set.get_datetime("refresh_token_expiry").unwrap(), &expires_at);
    }

    #[test]
    fn test_profile_update_leaves_session_alone() {
        let mut user = User::new_local("vinay_21".into(), "vinay@test.com".into(), "hash".into(), Role::Manager);
        user.refresh_token = Some("tok".into());
        user.tour_completed = true;

        let update = profile_update(&user);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("role").unwrap(), "Manager");
        assert!(set.get_bool("tour_completed").unwrap());
        assert!(!set.contains_key("refresh_token"));
        assert!(!set.contains_key("refresh_token_expiry"));
        assert!(!set.contains_key("_id"));
    }

    #[test]
    fn test_session_update_clears_both_fields() {
        let update = session_update(None);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get("refresh_token"), Some(&Bson::Null));
        assert_eq!(set.get("refresh_token_expiry"), Some(&Bson::Null));
    }
}
