//! # 사용자 관리 서비스 구현
//!
//! 로컬 계정의 생명주기(가입, 조회, 수정, 삭제, 역할 변경, 투어 상태)를 담당합니다.
//!
//! ## 처리 흐름
//!
//! ```text
//! handler ──► UserService ──► RolePolicy (역할 검증)
//!                  │
//!                  ├──► PasswordHasher (bcrypt, 블로킹 풀)
//!                  │
//!                  └──► CredentialStore (중복 확인, 저장)
//! ```
//!
//! 중복 확인은 사용자명을 먼저, 이메일을 다음으로 보고 처음 발견한 충돌을 보고합니다.
//! 이메일은 로컬 계정과 OAuth 계정을 모두 확인합니다.
//! 저장 시점의 유니크 인덱스 위반도 같은 `ConflictError`로 돌아옵니다.

use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::DateTime;

use crate::config::AdminSeed;
use crate::domain::dto::users::request::{CreateUserRequest, UpdateUserRequest};
use crate::domain::dto::users::response::{TourStatusResponse, UserResponse};
use crate::domain::entities::{Role, User};
use crate::errors::{AppError, AppResult};
use crate::repositories::CredentialStore;
use crate::services::auth::{PasswordHasher, RolePolicy};
use crate::utils::string_utils::{mask_email, normalize_email, validate_required_string};

pub struct UserService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// 회원가입
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - 필수 값 누락 또는 허용되지 않은 역할
    /// * `AppError::ConflictError` - 사용자명 또는 이메일 중복
    pub async fn register(&self, request: CreateUserRequest) -> AppResult<UserResponse> {
        let username = validate_required_string(&request.username, "Username")?;
        let email = normalize_email(&validate_required_string(&request.email, "Email")?);
        if request.password.is_empty() {
            return Err(AppError::ValidationError("Password is required.".to_string()));
        }
        let role = RolePolicy::resolve_optional(request.role.as_deref())?;

        self.ensure_unique(&username, &email, None).await?;

        let password_hash = self.hasher.hash(&request.password).await?;
        let created = self
            .store
            .insert_user(User::new_local(username, email, password_hash, role))
            .await?;

        info!("🆕 회원가입: {} (id: {}, role: {})", mask_email(&created.email), created.id, created.role);
        Ok(UserResponse::from(created))
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_user(&self, id: i64) -> AppResult<UserResponse> {
        Ok(UserResponse::from(self.find_user(id).await?))
    }

    /// 프로필 수정
    ///
    /// 중복 확인에서 자기 자신은 제외합니다. 패스워드와 역할은 값이 있을 때만 바뀝니다.
    pub async fn update_user(&self, id: i64, request: UpdateUserRequest) -> AppResult<UserResponse> {
        let username = validate_required_string(&request.username, "Username")?;
        let email = normalize_email(&validate_required_string(&request.email, "Email")?);

        let mut user = self.find_user(id).await?;
        self.ensure_unique(&username, &email, Some(id)).await?;

        if let Some(role) = request.role.as_deref() {
            user.role = RolePolicy::parse(role)?;
        }
        if let Some(password) = request.password.as_deref() {
            user.password_hash = self.hasher.hash(password).await?;
        }
        user.username = username;
        user.email = email;
        user.updated_at = DateTime::now();

        if !self.store.update_user(&user).await? {
            return Err(user_not_found());
        }

        info!("✏️ 사용자 정보 수정 (id: {})", id);
        Ok(UserResponse::from(user))
    }

    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        if !self.store.delete_user(id).await? {
            return Err(user_not_found());
        }

        info!("🗑️ 사용자 삭제 (id: {})", id);
        Ok(())
    }

    /// 역할 변경
    ///
    /// 역할 값 검증이 계정 조회보다 먼저입니다.
    pub async fn update_role(&self, id: i64, raw_role: &str) -> AppResult<UserResponse> {
        let role = RolePolicy::parse(raw_role)?;

        let mut user = self.find_user(id).await?;
        user.role = role;
        user.updated_at = DateTime::now();

        if !self.store.update_user(&user).await? {
            return Err(user_not_found());
        }

        info!("🛡️ 역할 변경 (id: {}): {}", id, role);
        Ok(UserResponse::from(user))
    }

    pub async fn tour_status(&self, id: i64) -> AppResult<TourStatusResponse> {
        let user = self.find_user(id).await?;
        Ok(TourStatusResponse {
            tour_completed: user.tour_completed,
        })
    }

    pub async fn complete_tour(&self, id: i64) -> AppResult<TourStatusResponse> {
        let mut user = self.find_user(id).await?;

        if !user.tour_completed {
            user.tour_completed = true;
            user.updated_at = DateTime::now();
            self.store.update_user(&user).await?;
        }

        Ok(TourStatusResponse { tour_completed: true })
    }

    /// 관리자 계정이 하나도 없으면 시드 정보로 만듭니다.
    ///
    /// 생성했으면 `true`.
    pub async fn seed_default_admin(&self, seed: Option<&AdminSeed>) -> AppResult<bool> {
        let Some(seed) = seed else {
            return Ok(false);
        };

        if self.store.any_user_with_role(Role::Admin).await? {
            return Ok(false);
        }

        let email = normalize_email(&seed.email);
        if self.store.email_exists(&email, None).await? {
            warn!("관리자 시드 이메일이 이미 일반 계정에 사용 중입니다: {}", mask_email(&email));
            return Ok(false);
        }

        let password_hash = self.hasher.hash(&seed.password).await?;
        let admin = self
            .store
            .insert_user(User::new_local(seed.username.trim().to_string(), email, password_hash, Role::Admin))
            .await?;

        info!("👑 기본 관리자 계정 생성: {} (id: {})", mask_email(&admin.email), admin.id);
        Ok(true)
    }

    async fn find_user(&self, id: i64) -> AppResult<User> {
        self.store
            .find_user_by_id(id)
            .await?
            .ok_or_else(user_not_found)
    }

    /// 이메일은 OAuth 계정과도 겹칠 수 없습니다.
    async fn ensure_unique(&self, username: &str, email: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let (username_taken, email_taken, oauth_owner) = futures_util::try_join!(
            self.store.username_exists(username, exclude_id),
            self.store.email_exists(email, exclude_id),
            self.store.find_oauth_user_by_email(email),
        )?;

        if username_taken {
            return Err(AppError::ConflictError("Username already exists.".to_string()));
        }
        if email_taken || oauth_owner.is_some() {
            return Err(AppError::ConflictError("Email already exists.".to_string()));
        }
        Ok(())
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found.".to_string())
}
