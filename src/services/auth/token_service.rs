//! JWT 토큰 관리 서비스 구현
//!
//! HS256 서명 액세스 토큰과 불투명(opaque) 리프레시 토큰을 발급합니다.
//!
//! - 액세스 토큰: 클레임을 담은 JWT. 서명, 만료(여유 시간 없음), 발급자, 대상을 검증합니다.
//! - 리프레시 토큰: OS 난수 64바이트의 base64 문자열. 클레임이 없으며
//!   저장된 값과의 일치 여부로만 확인됩니다.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::DateTime;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::AuthSettings;
use crate::domain::entities::StoredSession;
use crate::domain::models::token::{IssuedAccessToken, LoginMethod, TokenClaims, TokenPair, TokenSubject};
use crate::errors::{AppError, AppResult, ErrorContext};

const REFRESH_TOKEN_BYTES: usize = 64;

/// JWT 토큰 관리 서비스
pub struct TokenService {
    settings: AuthSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(settings: AuthSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.jwt_secret.as_bytes());

        Self {
            settings,
            encoding_key,
            decoding_key,
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// 서명된 액세스 토큰 발급
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 토큰 인코딩 실패
    pub fn issue_access_token(&self, subject: &TokenSubject, ttl: Duration) -> AppResult<IssuedAccessToken> {
        let now = Utc::now();
        let expiration = now + ttl;

        let claims = TokenClaims {
            sub: subject.username.clone(),
            role: subject.role,
            email: subject.email.clone(),
            user_id: subject.user_id,
            kind: subject.kind,
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("JWT 토큰 생성 실패")?;

        Ok(IssuedAccessToken {
            token,
            expires_in: ttl.num_seconds(),
        })
    }

    /// 리프레시 토큰 생성 (OS CSPRNG 64바이트, 표준 base64)
    pub fn issue_refresh_token(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }

    /// 새 리프레시 세션 (토큰 + 만료 시각)
    pub fn new_session(&self) -> StoredSession {
        let expires_at = Utc::now() + self.settings.refresh_ttl;
        StoredSession {
            refresh_token: self.issue_refresh_token(),
            expires_at: DateTime::from_millis(expires_at.timestamp_millis()),
        }
    }

    /// 토큰 쌍 생성
    ///
    /// 응답용 [`TokenPair`]와 저장할 [`StoredSession`]을 함께 반환합니다.
    /// 저장은 호출자의 책임입니다.
    pub fn issue_pair(&self, subject: &TokenSubject, method: LoginMethod) -> AppResult<(TokenPair, StoredSession)> {
        let access = self.issue_access_token(subject, self.settings.access_ttl_for(method))?;
        let session = self.new_session();

        let refresh_expires_at = chrono::DateTime::<Utc>::from_timestamp_millis(session.expires_at.timestamp_millis())
            .ok_or_else(|| AppError::InternalError("리프레시 만료 시각 변환 실패".to_string()))?;

        let pair = TokenPair {
            access_token: access.token,
            refresh_token: session.refresh_token.clone(),
            token_type: "Bearer",
            expires_in: access.expires_in,
            refresh_expires_at,
        };

        Ok((pair, session))
    }

    /// 액세스 토큰 검증
    ///
    /// # Errors
    ///
    /// * `AppError::AuthenticationError` - 만료, 서명 불일치, 발급자/대상 불일치, 형식 오류
    pub fn verify_access_token(&self, token: &str) -> AppResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.set_audience(&[self.settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::AuthenticationError("토큰이 만료되었습니다".to_string())
                }
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    AppError::AuthenticationError("토큰 발급자 또는 대상이 올바르지 않습니다".to_string())
                }
                ErrorKind::InvalidSignature => {
                    AppError::AuthenticationError("토큰 서명이 올바르지 않습니다".to_string())
                }
                _ => AppError::AuthenticationError(format!("유효하지 않은 토큰입니다: {}", e)),
            })
    }

    /// `Authorization` 헤더 값에서 Bearer 토큰을 추출
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> AppResult<&'a str> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(AppError::AuthenticationError(
                "Bearer 토큰 형식이 올바르지 않습니다".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Role;
    use crate::domain::models::token::AccountKind;

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: 42,
            username: "vinay_21".into(),
            email: "vinay@test.com".into(),
            role: Role::Engineer,
            kind: AccountKind::Local,
        }
    }

    fn service() -> TokenService {
        TokenService::new(AuthSettings::with_secret("unit-test-secret"))
    }

    #[test]
    fn test_access_token_roundtrip_claims() {
        let service = service();
        let issued = service.issue_access_token(&subject(), Duration::minutes(60)).unwrap();
        let claims = service.verify_access_token(&issued.token).unwrap();

        assert_eq!(issued.expires_in, 3600);
        assert_eq!(claims.sub, "vinay_21");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, Role::Engineer);
        assert_eq!(claims.kind, AccountKind::Local);
        assert_eq!(claims.iss, "auth-microservice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        let issued = service.issue_access_token(&subject(), Duration::seconds(-5)).unwrap();
        assert!(matches!(
            service.verify_access_token(&issued.token),
            Err(AppError::AuthenticationError(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issued = service().issue_access_token(&subject(), Duration::minutes(5)).unwrap();
        let other = TokenService::new(AuthSettings::with_secret("another-secret"));
        assert!(other.verify_access_token(&issued.token).is_err());
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let issued = service().issue_access_token(&subject(), Duration::minutes(5)).unwrap();
        let mut settings = AuthSettings::with_secret("unit-test-secret");
        settings.audience = "someone-else".into();
        assert!(TokenService::new(settings).verify_access_token(&issued.token).is_err());
    }

    #[test]
    fn test_refresh_token_is_64_random_bytes() {
        let service = service();
        let a = service.issue_refresh_token();
        let b = service.issue_refresh_token();

        assert_eq!(STANDARD.decode(&a).unwrap().len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pair_uses_method_ttl() {
        let service = service();
        let (pair, session) = service.issue_pair(&subject(), LoginMethod::Otp).unwrap();

        assert_eq!(pair.expires_in, 24 * 3600);
        assert_eq!(pair.refresh_token, session.refresh_token);
        assert_eq!(pair.token_type, "Bearer");

        let days = (pair.refresh_expires_at - Utc::now()).num_hours();
        assert!((167..=168).contains(&days));
    }

    #[test]
    fn test_extract_bearer_token() {
        let service = service();
        assert_eq!(service.extract_bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert!(service.extract_bearer_token("Basic abc").is_err());
        assert!(service.extract_bearer_token("Bearer ").is_err());
    }
}
