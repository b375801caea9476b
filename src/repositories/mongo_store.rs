//! # MongoDB Credential Store
//!
//! 세 개의 컬렉션 리포지토리를 묶어 [`CredentialStore`]를 구현합니다.
//!
//! - 정수 ID는 `counters` 컬렉션의 `$inc` upsert로 발급합니다.
//! - OTP 로그인 커밋은 클라이언트 세션 트랜잭션 안에서
//!   활성 세션 재확인, OTP 사용 처리, 세션 기록을 함께 수행합니다.

use async_trait::async_trait;
use log::{error, info};
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{ClientSession, Collection};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::domain::entities::{OAuthUser, OtpRecord, Role, StoredSession, User};
use crate::errors::AppResult;
use crate::repositories::otp::OtpRepository;
use crate::repositories::users::user_repo::session_update;
use crate::repositories::users::{OAuthUserRepository, UserRepository};
use crate::repositories::{AccountRef, CredentialStore, OtpLoginCommit, SessionOwner};

const COUNTERS_COLLECTION: &str = "counters";

/// 중복 키(11000) 쓰기 에러인지 확인
pub(crate) fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

/// MongoDB 기반 자격 증명 저장소
#[derive(Clone)]
pub struct MongoCredentialStore {
    database: Database,
    users: UserRepository,
    oauth_users: OAuthUserRepository,
    otps: OtpRepository,
    counters: Collection<Counter>,
}

impl MongoCredentialStore {
    pub fn new(database: Database) -> Self {
        Self {
            users: UserRepository::new(&database),
            oauth_users: OAuthUserRepository::new(&database),
            otps: OtpRepository::new(&database),
            counters: database.get_database().collection::<Counter>(COUNTERS_COLLECTION),
            database,
        }
    }

    /// 모든 컬렉션의 인덱스를 생성합니다. 시작 시 한 번 호출됩니다.
    pub async fn create_indexes(&self) -> AppResult<()> {
        self.users.create_indexes().await?;
        self.oauth_users.create_indexes().await?;
        self.otps.create_indexes().await?;
        info!("✅ MongoDB 인덱스 생성 완료");
        Ok(())
    }

    async fn next_sequence(&self, name: &str) -> AppResult<i64> {
        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        counter.map(|c| c.seq).ok_or_else(|| {
            crate::errors::AppError::DatabaseError(format!("{} 시퀀스 발급 실패", name))
        })
    }

    async fn commit_otp_login_in(
        &self,
        session: &mut ClientSession,
        otp_id: &str,
        user_id: i64,
        stored: &StoredSession,
        require_no_active_session: bool,
    ) -> AppResult<OtpLoginCommit> {
        if require_no_active_session {
            let active = self
                .users
                .collection()
                .find_one(doc! { "_id": user_id, "refresh_token": { "$ne": null } })
                .session(&mut *session)
                .await?;
            if active.is_some() {
                return Ok(OtpLoginCommit::AlreadyLoggedIn);
            }
        }

        let consumed = self
            .otps
            .collection()
            .update_one(
                doc! { "_id": otp_id, "is_used": false },
                doc! { "$set": { "is_used": true } },
            )
            .session(&mut *session)
            .await?;
        if consumed.modified_count == 0 {
            return Ok(OtpLoginCommit::OtpAlreadyUsed);
        }

        self.users
            .collection()
            .update_one(doc! { "_id": user_id }, session_update(Some(stored.clone())))
            .session(&mut *session)
            .await?;

        Ok(OtpLoginCommit::Committed)
    }
}

#[async_trait]
impl CredentialStore for MongoCredentialStore {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn username_exists(&self, username: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        self.users.exists("username", username, exclude_id).await
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        self.users.exists("email", email, exclude_id).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn insert_user(&self, mut user: User) -> AppResult<User> {
        user.id = self.next_sequence("users").await?;
        self.users.create(&user).await?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> AppResult<bool> {
        self.users.update_profile(user).await
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        self.users.delete(id).await
    }

    async fn any_user_with_role(&self, role: Role) -> AppResult<bool> {
        self.users.any_with_role(role).await
    }

    async fn find_oauth_user_by_google_id(&self, google_id: &str) -> AppResult<Option<OAuthUser>> {
        self.oauth_users.find_by_google_id(google_id).await
    }

    async fn find_oauth_user_by_email(&self, email: &str) -> AppResult<Option<OAuthUser>> {
        self.oauth_users.find_by_email(email).await
    }

    async fn insert_oauth_user(&self, mut user: OAuthUser) -> AppResult<OAuthUser> {
        user.id = self.next_sequence("oauth_users").await?;
        self.oauth_users.create(&user).await?;
        Ok(user)
    }

    async fn update_oauth_user(&self, user: &OAuthUser) -> AppResult<bool> {
        self.oauth_users.update_profile(user).await
    }

    async fn find_session_owner(&self, refresh_token: &str) -> AppResult<Option<SessionOwner>> {
        if let Some(user) = self.users.find_by_refresh_token(refresh_token).await? {
            return Ok(Some(SessionOwner::Local(user)));
        }

        Ok(self
            .oauth_users
            .find_by_refresh_token(refresh_token)
            .await?
            .map(SessionOwner::OAuth))
    }

    async fn store_session(&self, account: AccountRef, session: Option<StoredSession>) -> AppResult<bool> {
        match account {
            AccountRef::Local(id) => self.users.set_session(id, session).await,
            AccountRef::OAuth(id) => self.oauth_users.set_session(id, session).await,
        }
    }

    async fn insert_otp(&self, record: OtpRecord) -> AppResult<()> {
        self.otps.create(&record).await
    }

    async fn latest_unused_otp(&self, email: &str) -> AppResult<Option<OtpRecord>> {
        self.otps.find_latest_unused(email).await
    }

    async fn delete_otps_for_email(&self, email: &str) -> AppResult<u64> {
        self.otps.delete_for_email(email).await
    }

    async fn commit_otp_login(
        &self,
        otp_id: &str,
        user_id: i64,
        stored: &StoredSession,
        require_no_active_session: bool,
    ) -> AppResult<OtpLoginCommit> {
        let mut session = self.database.client().start_session().await?;
        session.start_transaction().await?;

        let outcome = self
            .commit_otp_login_in(&mut session, otp_id, user_id, stored, require_no_active_session)
            .await;

        match outcome {
            Ok(OtpLoginCommit::Committed) => {
                session.commit_transaction().await?;
                Ok(OtpLoginCommit::Committed)
            }
            Ok(rejected) => {
                session.abort_transaction().await?;
                Ok(rejected)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    error!("OTP 로그인 트랜잭션 중단 실패: {}", abort_err);
                }
                Err(e)
            }
        }
    }
}
