//! In-memory credential store
//!
//! 개발 환경(`STORE_BACKEND=memory`)과 테스트에서 사용하는 저장소입니다.
//! 모든 상태는 하나의 `RwLock` 뒤에 있으므로 OTP 로그인 커밋은 단일 쓰기 잠금 안에서
//! 원자적으로 수행됩니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mongodb::bson::DateTime;

use crate::domain::entities::{OAuthUser, OtpRecord, Role, StoredSession, User};
use crate::errors::{AppError, AppResult};
use crate::repositories::{AccountRef, CredentialStore, OtpLoginCommit, SessionOwner};

#[derive(Default)]
struct MemoryState {
    users: HashMap<i64, User>,
    oauth_users: HashMap<i64, OAuthUser>,
    otps: HashMap<String, OtpRecord>,
}

/// In-memory credential store
pub struct InMemoryCredentialStore {
    state: RwLock<MemoryState>,
    next_user_id: AtomicI64,
    next_oauth_user_id: AtomicI64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            next_user_id: AtomicI64::new(1),
            next_oauth_user_id: AtomicI64::new(1),
        }
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| AppError::InternalError("메모리 저장소 잠금 실패".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| AppError::InternalError("메모리 저장소 잠금 실패".to_string()))
    }

    /// OTP 만료 시각을 강제로 바꿉니다 (테스트용)
    pub fn set_otp_expiry(&self, otp_id: &str, expiry_at: DateTime) -> AppResult<()> {
        let mut state = self.write()?;
        match state.otps.get_mut(otp_id) {
            Some(record) => {
                record.expiry_at = expiry_at;
                Ok(())
            }
            None => Err(AppError::NotFound("OTP not found.".to_string())),
        }
    }

    fn check_user_unique(state: &MemoryState, user: &User) -> AppResult<()> {
        let others = state.users.values().filter(|u| u.id != user.id);
        for other in others {
            if other.username == user.username {
                return Err(AppError::ConflictError("Username already exists.".to_string()));
            }
            if other.email == user.email {
                return Err(AppError::ConflictError("Email already exists.".to_string()));
            }
        }
        Ok(())
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.read()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn username_exists(&self, username: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        Ok(self
            .read()?
            .users
            .values()
            .any(|u| u.username == username && Some(u.id) != exclude_id))
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        Ok(self
            .read()?
            .users
            .values()
            .any(|u| u.email == email && Some(u.id) != exclude_id))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn insert_user(&self, mut user: User) -> AppResult<User> {
        let mut state = self.write()?;
        user.id = 0;
        Self::check_user_unique(&state, &user)?;

        user.id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> AppResult<bool> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user.id) {
            return Ok(false);
        }
        Self::check_user_unique(&state, user)?;

        let Some(existing) = state.users.get_mut(&user.id) else {
            return Ok(false);
        };
        existing.username = user.username.clone();
        existing.email = user.email.clone();
        existing.password_hash = user.password_hash.clone();
        existing.role = user.role;
        existing.tour_completed = user.tour_completed;
        existing.updated_at = DateTime::now();
        Ok(true)
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        Ok(self.write()?.users.remove(&id).is_some())
    }

    async fn any_user_with_role(&self, role: Role) -> AppResult<bool> {
        Ok(self.read()?.users.values().any(|u| u.role == role))
    }

    async fn find_oauth_user_by_google_id(&self, google_id: &str) -> AppResult<Option<OAuthUser>> {
        Ok(self
            .read()?
            .oauth_users
            .values()
            .find(|u| u.google_id == google_id)
            .cloned())
    }

    async fn find_oauth_user_by_email(&self, email: &str) -> AppResult<Option<OAuthUser>> {
        Ok(self
            .read()?
            .oauth_users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_oauth_user(&self, mut user: OAuthUser) -> AppResult<OAuthUser> {
        let mut state = self.write()?;
        if state.oauth_users.values().any(|u| u.google_id == user.google_id) {
            return Err(AppError::ConflictError("Google account already linked.".to_string()));
        }

        user.id = self.next_oauth_user_id.fetch_add(1, Ordering::SeqCst);
        state.oauth_users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_oauth_user(&self, user: &OAuthUser) -> AppResult<bool> {
        let mut state = self.write()?;
        match state.oauth_users.get_mut(&user.id) {
            Some(existing) => {
                existing.email = user.email.clone();
                existing.username = user.username.clone();
                existing.role = user.role;
                existing.provider_access_token = user.provider_access_token.clone();
                existing.provider_refresh_token = user.provider_refresh_token.clone();
                existing.updated_at = DateTime::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_session_owner(&self, refresh_token: &str) -> AppResult<Option<SessionOwner>> {
        let state = self.read()?;

        if let Some(user) = state
            .users
            .values()
            .find(|u| u.refresh_token.as_deref() == Some(refresh_token))
        {
            return Ok(Some(SessionOwner::Local(user.clone())));
        }

        Ok(state
            .oauth_users
            .values()
            .find(|u| u.refresh_token.as_deref() == Some(refresh_token))
            .cloned()
            .map(SessionOwner::OAuth))
    }

    async fn store_session(&self, account: AccountRef, session: Option<StoredSession>) -> AppResult<bool> {
        let mut state = self.write()?;
        match account {
            AccountRef::Local(id) => match state.users.get_mut(&id) {
                Some(user) => {
                    user.apply_session(session);
                    Ok(true)
                }
                None => Ok(false),
            },
            AccountRef::OAuth(id) => match state.oauth_users.get_mut(&id) {
                Some(user) => {
                    user.apply_session(session);
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    async fn insert_otp(&self, record: OtpRecord) -> AppResult<()> {
        self.write()?.otps.insert(record.id.clone(), record);
        Ok(())
    }

    async fn latest_unused_otp(&self, email: &str) -> AppResult<Option<OtpRecord>> {
        Ok(self
            .read()?
            .otps
            .values()
            .filter(|r| r.email == email && !r.is_used)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn delete_otps_for_email(&self, email: &str) -> AppResult<u64> {
        let mut state = self.write()?;
        let before = state.otps.len();
        state.otps.retain(|_, r| r.email != email);
        Ok((before - state.otps.len()) as u64)
    }

    async fn commit_otp_login(
        &self,
        otp_id: &str,
        user_id: i64,
        session: &StoredSession,
        require_no_active_session: bool,
    ) -> AppResult<OtpLoginCommit> {
        let mut state = self.write()?;

        let has_session = match state.users.get(&user_id) {
            Some(user) => user.has_active_session(),
            None => return Err(AppError::NotFound("User not found.".to_string())),
        };
        if require_no_active_session && has_session {
            return Ok(OtpLoginCommit::AlreadyLoggedIn);
        }

        match state.otps.get_mut(otp_id) {
            Some(record) if !record.is_used => record.is_used = true,
            _ => return Ok(OtpLoginCommit::OtpAlreadyUsed),
        }

        if let Some(user) = state.users.get_mut(&user_id) {
            user.apply_session(Some(session.clone()));
        }
        Ok(OtpLoginCommit::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> User {
        User::new_local(username.into(), email.into(), "hash".into(), Role::User)
    }

    fn session(token: &str) -> StoredSession {
        StoredSession {
            refresh_token: token.into(),
            expires_at: DateTime::from_millis(DateTime::now().timestamp_millis() + 60_000),
        }
    }

    #[actix_web::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryCredentialStore::new();
        let a = store.insert_user(user("alice", "alice@example.com")).await.unwrap();
        let b = store.insert_user(user("bob", "bob@example.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[actix_web::test]
    async fn test_insert_rejects_duplicates() {
        let store = InMemoryCredentialStore::new();
        store.insert_user(user("alice", "alice@example.com")).await.unwrap();

        let dup_name = store.insert_user(user("alice", "other@example.com")).await;
        assert!(matches!(dup_name, Err(AppError::ConflictError(_))));

        let dup_email = store.insert_user(user("other", "alice@example.com")).await;
        assert!(matches!(dup_email, Err(AppError::ConflictError(_))));
    }

    #[actix_web::test]
    async fn test_exists_respects_exclusion() {
        let store = InMemoryCredentialStore::new();
        let alice = store.insert_user(user("alice", "alice@example.com")).await.unwrap();

        assert!(store.username_exists("alice", None).await.unwrap());
        assert!(!store.username_exists("alice", Some(alice.id)).await.unwrap());
        assert!(!store.email_exists("alice@example.com", Some(alice.id)).await.unwrap());
    }

    #[actix_web::test]
    async fn test_update_user_does_not_touch_session() {
        let store = InMemoryCredentialStore::new();
        let created = store.insert_user(user("alice", "alice@example.com")).await.unwrap();
        store
            .store_session(AccountRef::Local(created.id), Some(session("fresh")))
            .await
            .unwrap();

        let mut edited = created.clone();
        edited.username = "alice2".into();
        assert!(store.update_user(&edited).await.unwrap());

        let stored = store.find_user_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.username, "alice2");
        assert_eq!(stored.refresh_token.as_deref(), Some("fresh"));
    }

    #[actix_web::test]
    async fn test_session_owner_prefers_local_accounts() {
        let store = InMemoryCredentialStore::new();
        let local = store.insert_user(user("alice", "alice@example.com")).await.unwrap();
        let oauth = store
            .insert_oauth_user(OAuthUser::new("g@example.com".into(), "g".into(), "gid".into(), None, None))
            .await
            .unwrap();

        store.store_session(AccountRef::OAuth(oauth.id), Some(session("shared"))).await.unwrap();
        assert!(matches!(
            store.find_session_owner("shared").await.unwrap(),
            Some(SessionOwner::OAuth(_))
        ));

        store.store_session(AccountRef::Local(local.id), Some(session("shared"))).await.unwrap();
        assert!(matches!(
            store.find_session_owner("shared").await.unwrap(),
            Some(SessionOwner::Local(_))
        ));
        assert!(store.find_session_owner("missing").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_latest_unused_otp_skips_used_records() {
        let store = InMemoryCredentialStore::new();
        let mut used = OtpRecord::new("a@example.com".into(), 111111, 5);
        used.is_used = true;
        let fresh = OtpRecord::new("a@example.com".into(), 222222, 5);
        store.insert_otp(used).await.unwrap();
        store.insert_otp(fresh.clone()).await.unwrap();

        let latest = store.latest_unused_otp("a@example.com").await.unwrap().unwrap();
        assert_eq!(latest.id, fresh.id);

        assert_eq!(store.delete_otps_for_email("a@example.com").await.unwrap(), 2);
        assert!(store.latest_unused_otp("a@example.com").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_commit_otp_login_is_all_or_nothing() {
        let store = InMemoryCredentialStore::new();
        let alice = store.insert_user(user("alice", "alice@example.com")).await.unwrap();
        let otp = OtpRecord::new("alice@example.com".into(), 123456, 5);
        store.insert_otp(otp.clone()).await.unwrap();

        let first = store.commit_otp_login(&otp.id, alice.id, &session("t1"), true).await.unwrap();
        assert_eq!(first, OtpLoginCommit::Committed);

        let stored = store.find_user_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("t1"));

        // 같은 OTP 재사용 시도: 세션이 이미 있으므로 먼저 거부됨
        let again = store.commit_otp_login(&otp.id, alice.id, &session("t2"), true).await.unwrap();
        assert_eq!(again, OtpLoginCommit::AlreadyLoggedIn);

        let reuse = store.commit_otp_login(&otp.id, alice.id, &session("t3"), false).await.unwrap();
        assert_eq!(reuse, OtpLoginCommit::OtpAlreadyUsed);

        let stored = store.find_user_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("t1"));
    }
}
