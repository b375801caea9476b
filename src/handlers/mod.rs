//! HTTP 핸들러 모듈
//!
//! 핸들러는 요청 형식 검증과 쿠키/상태 코드 처리만 하고, 나머지는
//! `web::Data<ServiceContainer>`의 서비스에 위임합니다. 에러는 `AppError`로 반환되어
//! `{"error": "..."}` 형태로 응답됩니다.
//!
//! - [`auth`] - 가입, 로그인, OTP, Google OAuth, 토큰 갱신, 로그아웃, 현재 사용자
//! - [`users`] - 사용자 관리, 역할 변경, 투어 상태

pub mod users;
pub mod auth;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::config::{AuthSettings, GoogleOAuthConfig, OtpConfig};
    use crate::core::ServiceContainer;
    use crate::repositories::InMemoryCredentialStore;
    use crate::services::auth::PasswordHasher;
    use crate::services::email::EmailSender;

    /// 메모리 저장소와 bcrypt cost 4로 구성한 컨테이너
    pub fn test_container(email_sender: Arc<dyn EmailSender>) -> ServiceContainer {
        ServiceContainer::with_settings(
            AuthSettings::with_secret("handler-test-secret"),
            PasswordHasher::new(4),
            OtpConfig::default(),
            GoogleOAuthConfig::default(),
            Arc::new(InMemoryCredentialStore::new()),
            email_sender,
        )
    }
}
