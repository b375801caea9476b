//! 세션 코어
//!
//! 패스워드 로그인, OTP 검증 로그인, OAuth 콜백, 토큰 갱신, 로그아웃,
//! 현재 사용자 조회를 담당합니다. 각 로그인 경로는 "판단 후 저장" 한 단계로
//! 끝나며, 저장소는 [`CredentialStore`] 하나만 사용합니다.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use mongodb::bson::DateTime;
use serde::Serialize;

use crate::config::AuthSettings;
use crate::domain::dto::users::response::UserResponse;
use crate::domain::entities::{OAuthUser, StoredSession};
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::oauth::OAuthPrincipal;
use crate::domain::models::token::{AccountKind, LoginMethod, TokenPair, TokenSubject};
use crate::errors::{AppError, AppResult};
use crate::repositories::{AccountRef, CredentialStore, OtpLoginCommit, SessionOwner};
use crate::services::auth::{PasswordHasher, TokenService};
use crate::utils::string_utils::{mask_email, normalize_email, validate_required_string};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// OAuth 콜백 결과
///
/// 리프레시 토큰은 `OAUTH_ISSUE_REFRESH_TOKEN`이 켜진 경우에만 채워집니다.
#[derive(Debug, Clone, Serialize)]
pub struct OAuthLoginResult {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_expires_at: Option<chrono::DateTime<Utc>>,
    pub account: UserResponse,
}

pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl SessionService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self { store, hasher, tokens }
    }

    fn settings(&self) -> &AuthSettings {
        self.tokens.settings()
    }

    /// 이메일/패스워드 로그인
    ///
    /// 존재하지 않는 이메일과 틀린 패스워드는 같은 에러로 응답합니다.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let email = normalize_email(&validate_required_string(email, "Email")?);
        if password.trim().is_empty() {
            return Err(AppError::ValidationError("Password is required.".to_string()));
        }

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!("🚫 로그인 실패 (계정 없음): {}", mask_email(&email));
            return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        };

        if !self.hasher.verify(password, &user.password_hash).await {
            warn!("🚫 로그인 실패 (비밀번호 불일치): {}", mask_email(&email));
            return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        }

        let (pair, session) = self
            .tokens
            .issue_pair(&TokenSubject::from(&user), LoginMethod::Password)?;
        self.store
            .store_session(AccountRef::Local(user.id), Some(session))
            .await?;

        info!("✅ 로그인 성공: {} (id: {})", mask_email(&email), user.id);
        Ok(pair)
    }

    /// OTP 검증 후 토큰 발급
    ///
    /// OTP 사용 처리와 세션 저장은 저장소의 원자 연산 한 번으로 끝납니다.
    pub async fn verify_otp_and_issue(&self, email: &str, code: u32) -> AppResult<TokenPair> {
        let email = normalize_email(&validate_required_string(email, "Email")?);

        let otp = self
            .store
            .latest_unused_otp(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("OTP not found.".to_string()))?;

        if otp.is_used {
            return Err(AppError::AlreadyUsed("OTP already used.".to_string()));
        }
        if otp.is_expired(DateTime::now()) {
            return Err(AppError::Expired("OTP expired.".to_string()));
        }
        if otp.code != code {
            warn!("🚫 OTP 불일치: {}", mask_email(&email));
            return Err(AppError::InvalidCode("Invalid OTP.".to_string()));
        }

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        let single_session = self.settings().otp_single_active_session;
        if single_session && user.has_active_session() {
            return Err(already_logged_in());
        }

        let (pair, session) = self.tokens.issue_pair(&TokenSubject::from(&user), LoginMethod::Otp)?;

        match self
            .store
            .commit_otp_login(&otp.id, user.id, &session, single_session)
            .await?
        {
            OtpLoginCommit::Committed => {
                info!("✅ OTP 로그인 성공: {} (id: {})", mask_email(&email), user.id);
                Ok(pair)
            }
            OtpLoginCommit::AlreadyLoggedIn => Err(already_logged_in()),
            OtpLoginCommit::OtpAlreadyUsed => {
                Err(AppError::AlreadyUsed("OTP already used.".to_string()))
            }
        }
    }

    /// 외부 제공자가 확인한 신원으로 OAuth 계정을 찾거나 만들고 액세스 토큰을 발급합니다.
    ///
    /// 같은 이메일의 로컬 계정이 있으면 아무것도 만들지 않고 충돌로 응답합니다.
    pub async fn handle_oauth_callback(&self, principal: OAuthPrincipal) -> AppResult<OAuthLoginResult> {
        let email = principal
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::ValidationError("Email is required.".to_string()))?;
        let provider_id = principal
            .provider_user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::ValidationError("Provider user id is required.".to_string()))?
            .to_string();

        if self.store.email_exists(&email, None).await? {
            warn!("⚠️ OAuth 로그인 거부 (로컬 계정 존재): {}", mask_email(&email));
            return Err(AppError::ConflictError(
                "An account with this email already exists. Please log in with your password.".to_string(),
            ));
        }

        let mut account = match self.store.find_oauth_user_by_google_id(&provider_id).await? {
            Some(mut existing) => {
                existing.refresh_provider_tokens(
                    principal.provider_access_token,
                    principal.provider_refresh_token,
                );
                self.store.update_oauth_user(&existing).await?;
                existing
            }
            None => {
                let username = principal
                    .display_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| email_local_part(&email));

                let created = self
                    .store
                    .insert_oauth_user(OAuthUser::new(
                        email.clone(),
                        username,
                        provider_id,
                        principal.provider_access_token,
                        principal.provider_refresh_token,
                    ))
                    .await?;
                info!("🆕 OAuth 계정 생성: {} (id: {})", mask_email(&email), created.id);
                created
            }
        };

        let settings = self.settings();
        let access = self
            .tokens
            .issue_access_token(&TokenSubject::from(&account), settings.access_ttl_for(LoginMethod::OAuth))?;

        let mut refresh_token = None;
        let mut refresh_expires_at = None;
        if settings.oauth_issue_refresh_token {
            let session = self.tokens.new_session();
            self.store
                .store_session(AccountRef::OAuth(account.id), Some(session.clone()))
                .await?;
            refresh_expires_at = chrono::DateTime::<Utc>::from_timestamp_millis(session.expires_at.timestamp_millis());
            refresh_token = Some(session.refresh_token.clone());
            account.apply_session(Some(session));
        }

        info!("✅ OAuth 로그인 성공: {} (id: {})", mask_email(&email), account.id);
        Ok(OAuthLoginResult {
            access_token: access.token,
            token_type: "Bearer",
            expires_in: access.expires_in,
            refresh_token,
            refresh_expires_at,
            account: UserResponse::from(&account),
        })
    }

    /// 리프레시 토큰 회전
    ///
    /// 새 토큰이 저장되는 즉시 이전 토큰은 무효가 됩니다.
    pub async fn refresh_tokens(&self, presented: &str) -> AppResult<TokenPair> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AppError::ValidationError("Refresh token is required.".to_string()));
        }

        let owner = self
            .store
            .find_session_owner(presented)
            .await?
            .ok_or_else(|| AppError::InvalidToken("Invalid refresh token.".to_string()))?;

        if is_session_expired(owner.session(), DateTime::now()) {
            warn!("⌛ 만료된 리프레시 토큰 사용: {}", mask_email(owner.email()));
            return Err(AppError::Expired("Refresh token expired.".to_string()));
        }

        let subject = match &owner {
            SessionOwner::Local(user) => TokenSubject::from(user),
            SessionOwner::OAuth(user) => TokenSubject::from(user),
        };
        let (pair, session) = self.tokens.issue_pair(&subject, LoginMethod::Refresh)?;

        self.store
            .store_session(owner.account_ref(), Some(session))
            .await?;

        info!("🔄 토큰 갱신: {} (id: {})", mask_email(owner.email()), subject.user_id);
        Ok(pair)
    }

    /// 로그아웃
    ///
    /// 토큰이 없거나 소유자가 없으면 아무것도 하지 않습니다.
    pub async fn logout(&self, presented: Option<&str>) -> AppResult<()> {
        let Some(presented) = presented.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(());
        };

        if let Some(owner) = self.store.find_session_owner(presented).await? {
            self.store.store_session(owner.account_ref(), None).await?;
            info!("👋 로그아웃: {}", mask_email(owner.email()));
        }

        Ok(())
    }

    /// 현재 인증된 사용자 정보
    ///
    /// 토큰의 `kind` 클레임이 조회할 저장소를 정합니다.
    pub async fn current_identity(&self, user: Option<&AuthenticatedUser>) -> AppResult<UserResponse> {
        let user = user
            .ok_or_else(|| AppError::AuthenticationError("Authentication required.".to_string()))?;
        let email = normalize_email(&user.email);

        let view = match user.kind {
            AccountKind::Local => self
                .store
                .find_user_by_email(&email)
                .await?
                .map(|local| UserResponse::from(&local)),
            AccountKind::OAuth => self
                .store
                .find_oauth_user_by_email(&email)
                .await?
                .map(|oauth| UserResponse::from(&oauth)),
        };

        view.ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }
}

fn already_logged_in() -> AppError {
    AppError::AlreadyLoggedIn("User is already logged in.".to_string())
}

/// 만료 시각이 없는 세션도 만료로 취급합니다.
fn is_session_expired(session: Option<StoredSession>, now: DateTime) -> bool {
    match session {
        Some(session) => session.is_expired(now),
        None => true,
    }
}

fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
