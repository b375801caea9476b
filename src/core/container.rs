//! 서비스 컨테이너
//!
//! 설정과 저장소, 메일 발송기를 받아 서비스 그래프를 한 번에 조립합니다.
//! 전역 상태 없이 `web::Data<ServiceContainer>`로 핸들러와 미들웨어에 전달됩니다.

use std::sync::Arc;

use crate::config::{AppConfig, AuthSettings, GoogleOAuthConfig, OtpConfig};
use crate::repositories::CredentialStore;
use crate::services::auth::{GoogleAuthService, OtpService, PasswordHasher, SessionService, TokenService};
use crate::services::email::EmailSender;
use crate::services::users::UserService;

#[derive(Clone)]
pub struct ServiceContainer {
    pub users: Arc<UserService>,
    pub sessions: Arc<SessionService>,
    pub otp: Arc<OtpService>,
    pub google: Arc<GoogleAuthService>,
    pub tokens: Arc<TokenService>,
}

impl ServiceContainer {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self::with_settings(
            config.auth.clone(),
            PasswordHasher::new(config.password.bcrypt_cost),
            config.otp.clone(),
            config.google.clone(),
            store,
            email_sender,
        )
    }

    pub fn with_settings(
        auth: AuthSettings,
        hasher: PasswordHasher,
        otp: OtpConfig,
        google: GoogleOAuthConfig,
        store: Arc<dyn CredentialStore>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(auth));

        Self {
            users: Arc::new(UserService::new(store.clone(), hasher.clone())),
            sessions: Arc::new(SessionService::new(store.clone(), hasher, tokens.clone())),
            otp: Arc::new(OtpService::new(store, email_sender, otp)),
            google: Arc::new(GoogleAuthService::new(google)),
            tokens,
        }
    }

    /// OAuth 리다이렉트 주소 등 설정 값이 필요한 핸들러용
    pub fn google_success_redirect(&self) -> &str {
        &self.google.config().success_redirect
    }
}
