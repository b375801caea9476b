//! OTP 발급
//!
//! 로컬 계정 이메일로 숫자 로그인 코드를 보냅니다. 검증은
//! [`SessionService::verify_otp_and_issue`](super::SessionService::verify_otp_and_issue)가 합니다.

use std::sync::Arc;

use log::info;
use rand::rngs::OsRng;
use rand::Rng;

use crate::config::OtpConfig;
use crate::domain::entities::OtpRecord;
use crate::errors::{AppError, AppResult};
use crate::repositories::CredentialStore;
use crate::services::email::EmailSender;
use crate::utils::string_utils::{mask_email, normalize_email, validate_required_string};

pub struct OtpService {
    store: Arc<dyn CredentialStore>,
    email_sender: Arc<dyn EmailSender>,
    config: OtpConfig,
}

impl OtpService {
    pub fn new(store: Arc<dyn CredentialStore>, email_sender: Arc<dyn EmailSender>, config: OtpConfig) -> Self {
        Self {
            store,
            email_sender,
            config,
        }
    }

    /// 이전 OTP를 모두 지우고 새 코드를 저장한 뒤 메일로 보냅니다.
    pub async fn request_otp(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(&validate_required_string(email, "Email")?);

        if self.store.find_user_by_email(&email).await?.is_none() {
            return Err(AppError::NotFound("User not found.".to_string()));
        }

        let removed = self.store.delete_otps_for_email(&email).await?;
        if removed > 0 {
            log::debug!("이전 OTP {}건 삭제: {}", removed, mask_email(&email));
        }

        let code = generate_code(self.config.digits);
        self.store
            .insert_otp(OtpRecord::new(email.clone(), code, self.config.ttl_minutes))
            .await?;

        self.email_sender
            .send_otp(&email, code, self.config.ttl_minutes)
            .await?;

        info!("🔢 OTP 발급: {} ({}분 유효)", mask_email(&email), self.config.ttl_minutes);
        Ok(())
    }
}

/// 정확히 `digits` 자리의 숫자 (첫 자리는 0이 아님)
pub(crate) fn generate_code(digits: u32) -> u32 {
    let low = 10u32.pow(digits - 1);
    let high = 10u32.pow(digits);
    OsRng.gen_range(low..high)
}
