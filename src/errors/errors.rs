//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! 인증 서비스를 위한 통합 에러 처리 시스템입니다.
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 세션 코어의 거부 사유를
//! 그대로 HTTP 상태 코드로 옮깁니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//!
//! async fn login(email: &str, password: &str) -> Result<TokenPair, AppError> {
//!     if email.trim().is_empty() {
//!         return Err(AppError::ValidationError("Email is required.".to_string()));
//!     }
//!
//!     let user = store.find_user_by_email(email).await?
//!         .ok_or_else(|| AppError::AuthenticationError("Invalid email or password.".to_string()))?;
//!
//!     issue_pair(&user).await
//! }
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 저장소 장애부터 OTP 거부 사유까지, 세션 코어가 만들어 낼 수 있는 모든 실패를
/// 포괄하는 열거형입니다. 자동으로 HTTP 응답으로 변환되어 클라이언트에게 전달됩니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 관련 에러 (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 충돌/중복 에러 (409 Conflict)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 인증 실패 에러 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 권한 부족 에러 (403 Forbidden)
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 만료된 자격 증명 (401 Unauthorized)
    ///
    /// 리프레시 토큰 만료와 OTP 만료 모두 이 변형으로 보고됩니다.
    #[error("Expired: {0}")]
    Expired(String),

    /// 어떤 계정에도 속하지 않는 리프레시 토큰 (401 Unauthorized)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// 이미 사용된 OTP (400 Bad Request)
    #[error("Already used: {0}")]
    AlreadyUsed(String),

    /// 일치하지 않는 OTP 코드 (400 Bad Request)
    #[error("Invalid code: {0}")]
    InvalidCode(String),

    /// 이미 활성 세션을 보유한 계정 (409 Conflict)
    #[error("Already logged in: {0}")]
    AlreadyLoggedIn(String),

    /// 외부 서비스 에러 (500 Internal Server Error)
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            AppError::Expired(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::AlreadyUsed(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCode(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyLoggedIn(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 에러 타입을 적절한 HTTP 상태 코드와 `{"error": "..."}` JSON 응답으로 변환합니다.
    /// 4xx 응답에는 접두어 없는 원문 메시지만 담깁니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        let message = if self.status_code().is_client_error() {
            self.message().to_string()
        } else {
            self.to_string()
        };

        actix_web::HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": message }))
    }
}

impl AppError {
    /// 변형 접두어를 뺀 메시지
    pub fn message(&self) -> &str {
        match self {
            AppError::DatabaseError(m)
            | AppError::ValidationError(m)
            | AppError::NotFound(m)
            | AppError::ConflictError(m)
            | AppError::AuthenticationError(m)
            | AppError::AuthorizationError(m)
            | AppError::Expired(m)
            | AppError::InvalidToken(m)
            | AppError::AlreadyUsed(m)
            | AppError::InvalidCode(m)
            | AppError::AlreadyLoggedIn(m)
            | AppError::ExternalServiceError(m)
            | AppError::InternalError(m) => m,
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("Email is required.".to_string());
        assert_eq!(error.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_credential_rejections_map_to_unauthorized() {
        for error in [
            AppError::AuthenticationError("Invalid email or password.".to_string()),
            AppError::Expired("Refresh token expired.".to_string()),
            AppError::InvalidToken("Invalid refresh token.".to_string()),
        ] {
            assert_eq!(error.error_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_otp_rejections_map_to_bad_request() {
        assert_eq!(
            AppError::AlreadyUsed("OTP already used.".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidCode("Invalid OTP.".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_conflicts() {
        assert_eq!(
            AppError::ConflictError("Email already exists.".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::AlreadyLoggedIn("User is already logged in.".to_string()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_infrastructure_errors_are_internal() {
        assert_eq!(
            AppError::DatabaseError("connection reset".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::ExternalServiceError("google down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_message_format() {
        let error = AppError::NotFound("User not found.".to_string());
        assert_eq!(error.to_string(), "Not found: User not found.");
        assert_eq!(error.message(), "User not found.");
    }

    #[actix_web::test]
    async fn test_client_error_body_has_bare_message() {
        let response = AppError::ConflictError("Email already exists.".to_string()).error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Email already exists.");
    }

    #[test]
    fn test_error_context() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "boom",
        ));
        match result.context("작업 실패") {
            Err(AppError::InternalError(msg)) => assert_eq!(msg, "작업 실패: boom"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
