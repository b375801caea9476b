//! # OTP 리포지토리 구현
//!
//! `user_otps` 컬렉션에 대한 MongoDB 데이터 액세스 계층입니다.
//! 조회 경로는 `{email, is_used, created_at desc}` 복합 인덱스를 사용합니다.

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

use crate::db::Database;
use crate::domain::entities::OtpRecord;
use crate::errors::AppResult;

pub const USER_OTPS_COLLECTION: &str = "user_otps";

#[derive(Clone)]
pub struct OtpRepository {
    collection: Collection<OtpRecord>,
}

impl OtpRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.get_database().collection::<OtpRecord>(USER_OTPS_COLLECTION),
        }
    }

    pub fn collection(&self) -> &Collection<OtpRecord> {
        &self.collection
    }

    pub async fn create(&self, record: &OtpRecord) -> AppResult<()> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    pub async fn find_latest_unused(&self, email: &str) -> AppResult<Option<OtpRecord>> {
        Ok(self
            .collection
            .find_one(doc! { "email": email, "is_used": false })
            .sort(doc! { "created_at": -1 })
            .await?)
    }

    pub async fn delete_for_email(&self, email: &str) -> AppResult<u64> {
        let result = self.collection.delete_many(doc! { "email": email }).await?;
        Ok(result.deleted_count)
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        let lookup_index = IndexModel::builder()
            .keys(doc! { "email": 1, "is_used": 1, "created_at": -1 })
            .options(IndexOptions::builder()
                .name("email_unused_recent".to_string())
                .build())
            .build();

        self.collection.create_index(lookup_index).await?;
        Ok(())
    }
}
