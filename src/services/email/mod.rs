//! OTP 이메일 발송
//!
//! - [`ConsoleEmailSender`] - 로그로만 출력 (개발 환경, SMTP 미설정 시)
//! - [`SmtpEmailSender`] - lettre 비동기 SMTP 전송 (STARTTLS)

pub mod console;
pub mod smtp;

use async_trait::async_trait;

use crate::errors::AppResult;

pub use console::ConsoleEmailSender;
pub use smtp::SmtpEmailSender;

/// OTP 발송 인터페이스
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// OTP 코드를 이메일로 보냅니다.
    async fn send_otp(&self, to: &str, code: u32, ttl_minutes: i64) -> AppResult<()>;

    /// 기동 로그에 표시할 발송기 이름
    fn name(&self) -> &'static str;
}

/// OTP 메일 제목과 본문
pub(crate) fn otp_message(code: u32, ttl_minutes: i64) -> (String, String) {
    let subject = "Your login code".to_string();
    let body = format!(
        "Your one-time login code is {}.\n\nIt expires in {} minute(s). If you did not request this code, you can ignore this email.",
        code, ttl_minutes
    );
    (subject, body)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_message_mentions_code_and_ttl() {
        let (subject, body) = otp_message(482913, 5);
        assert!(!subject.is_empty());
        assert!(body.contains("482913"));
        assert!(body.contains("5 minute"));
    }
}
