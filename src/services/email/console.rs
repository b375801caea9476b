//! 콘솔 발송기 (개발용)

use async_trait::async_trait;
use log::info;

use super::EmailSender;
use crate::errors::AppResult;
use crate::utils::string_utils::mask_email;

/// 메일을 보내지 않고 OTP를 로그로 출력합니다. SMTP가 설정되지 않은 환경에서만 사용됩니다.
#[derive(Debug, Default)]
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleEmailSender {
    async fn send_otp(&self, to: &str, code: u32, ttl_minutes: i64) -> AppResult<()> {
        info!(
            "📧 [console] {} 로그인 코드: {} ({}분 유효)",
            mask_email(to),
            code,
            ttl_minutes
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
