//! SMTP 발송기 (운영용)

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{error, info};

use super::{otp_message, EmailSender};
use crate::config::SmtpConfig;
use crate::errors::{AppError, AppResult, ErrorContext};
use crate::utils::string_utils::mask_email;

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: String,
}

impl SmtpEmailSender {
    /// STARTTLS 릴레이 전송을 구성합니다. 연결은 첫 발송 시점에 맺어집니다.
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("SMTP 전송 생성 실패")?
            .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        info!("✉️ SMTP 발송기 구성: {}:{}", config.host, config.port);

        Ok(Self {
            transport: builder.build(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn from_address(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_otp(&self, to: &str, code: u32, ttl_minutes: i64) -> AppResult<()> {
        let from = self
            .from_address()
            .parse()
            .context("발신 주소 형식 오류")?;
        let to_addr = to
            .parse()
            .map_err(|e| AppError::ValidationError(format!("Invalid recipient address: {}", e)))?;

        let (subject, body) = otp_message(code, ttl_minutes);
        let message = Message::builder()
            .from(from)
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .context("메일 생성 실패")?;

        self.transport.send(message).await.map_err(|e| {
            error!("OTP 메일 발송 실패 ({}): {}", mask_email(to), e);
            AppError::ExternalServiceError(format!("Failed to send OTP email: {}", e))
        })?;

        info!("📨 OTP 메일 발송 완료: {}", mask_email(to));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
