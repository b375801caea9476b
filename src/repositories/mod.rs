//! # Repository Layer
//!
//! 자격 증명 저장소 추상화와 구현체들입니다.
//!
//! - [`CredentialStore`] - 세션 코어가 의존하는 유일한 저장소 인터페이스
//! - [`memory::InMemoryCredentialStore`] - 프로세스 메모리 구현 (개발/테스트)
//! - [`mongo_store::MongoCredentialStore`] - MongoDB 구현 (운영)
//!
//! 로컬 계정과 OAuth 계정은 별도 컬렉션에 저장되며, 리프레시 토큰으로 소유자를
//! 찾을 때는 로컬 계정을 먼저, OAuth 계정을 다음으로 조회합니다.

pub mod memory;
pub mod mongo_store;
pub mod users;
pub mod otp;

use async_trait::async_trait;

use crate::domain::entities::{OAuthUser, OtpRecord, Role, StoredSession, User};
use crate::errors::AppResult;

pub use memory::InMemoryCredentialStore;
pub use mongo_store::MongoCredentialStore;

/// 리프레시 토큰의 소유 계정
///
/// 한 번의 연산 안에서 한 번만 조회되고, 이후 분기는 이 값으로만 결정됩니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOwner {
    Local(User),
    OAuth(OAuthUser),
}

impl SessionOwner {
    pub fn account_ref(&self) -> AccountRef {
        match self {
            SessionOwner::Local(user) => AccountRef::Local(user.id),
            SessionOwner::OAuth(user) => AccountRef::OAuth(user.id),
        }
    }

    pub fn session(&self) -> Option<StoredSession> {
        match self {
            SessionOwner::Local(user) => user.session(),
            SessionOwner::OAuth(user) => user.session(),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            SessionOwner::Local(user) => &user.email,
            SessionOwner::OAuth(user) => &user.email,
        }
    }
}

/// 세션을 기록할 계정 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRef {
    Local(i64),
    OAuth(i64),
}

/// OTP 소비 + 세션 기록 원자 연산의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpLoginCommit {
    /// OTP가 사용 처리되고 세션이 기록됨
    Committed,
    /// 계정이 이미 리프레시 토큰을 보유 중 (아무것도 변경되지 않음)
    AlreadyLoggedIn,
    /// 다른 요청이 먼저 OTP를 소비함 (아무것도 변경되지 않음)
    OtpAlreadyUsed,
}

/// 자격 증명 저장소
///
/// 모든 연산은 비동기이며 실행기를 막지 않습니다.
/// 중복 키 위반은 `AppError::ConflictError`, 그 밖의 저장소 장애는
/// `AppError::DatabaseError`로 보고됩니다.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    // ===== 로컬 계정 =====

    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// `exclude_id`에 해당하는 계정은 제외하고 사용자명 존재 여부를 확인합니다.
    async fn username_exists(&self, username: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// 새 ID를 발급해 저장하고, ID가 채워진 엔티티를 반환합니다.
    async fn insert_user(&self, user: User) -> AppResult<User>;

    /// 프로필 필드(사용자명, 이메일, 해시, 역할, 투어)만 갱신합니다.
    /// 리프레시 토큰과 만료 시각은 [`store_session`](Self::store_session)만 바꿉니다.
    /// 대상이 없으면 `false`.
    async fn update_user(&self, user: &User) -> AppResult<bool>;

    async fn delete_user(&self, id: i64) -> AppResult<bool>;

    async fn any_user_with_role(&self, role: Role) -> AppResult<bool>;

    // ===== OAuth 계정 =====

    async fn find_oauth_user_by_google_id(&self, google_id: &str) -> AppResult<Option<OAuthUser>>;

    async fn find_oauth_user_by_email(&self, email: &str) -> AppResult<Option<OAuthUser>>;

    async fn insert_oauth_user(&self, user: OAuthUser) -> AppResult<OAuthUser>;

    /// 프로필과 프로바이더 토큰만 갱신합니다. 세션 필드는 바뀌지 않습니다.
    async fn update_oauth_user(&self, user: &OAuthUser) -> AppResult<bool>;

    // ===== 세션 =====

    /// 리프레시 토큰 값과 정확히 일치하는 계정을 찾습니다 (로컬 우선).
    async fn find_session_owner(&self, refresh_token: &str) -> AppResult<Option<SessionOwner>>;

    /// 세션을 덮어쓰거나 (`None`이면) 토큰과 만료 시각을 함께 비웁니다.
    async fn store_session(&self, account: AccountRef, session: Option<StoredSession>) -> AppResult<bool>;

    // ===== OTP =====

    async fn insert_otp(&self, record: OtpRecord) -> AppResult<()>;

    /// 이메일의 미사용 OTP 중 가장 최근 것
    async fn latest_unused_otp(&self, email: &str) -> AppResult<Option<OtpRecord>>;

    async fn delete_otps_for_email(&self, email: &str) -> AppResult<u64>;

    /// OTP 사용 처리와 세션 기록을 하나의 원자 단위로 수행합니다.
    ///
    /// `require_no_active_session`이면 같은 단위 안에서 계정의 리프레시 토큰 부재를
    /// 다시 확인합니다.
    async fn commit_otp_login(
        &self,
        otp_id: &str,
        user_id: i64,
        session: &StoredSession,
        require_no_active_session: bool,
    ) -> AppResult<OtpLoginCommit>;
}
