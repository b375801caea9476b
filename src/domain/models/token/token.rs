//! JWT 인증 토큰 구조체 및 페어링 된 세트
//!
//! 액세스 토큰 클레임과, 로그인 경로가 모두 수렴하는 토큰 쌍 계약을 정의합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{OAuthUser, Role, User};

/// 계정 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// 이메일/패스워드 계정 (`users`)
    Local,
    /// Google 계정 (`oauth_users`)
    #[serde(rename = "oauth")]
    OAuth,
}

/// 토큰을 발급한 로그인 경로
///
/// 경로마다 액세스 토큰 수명이 다르게 설정될 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    Password,
    Otp,
    OAuth,
    Refresh,
}

/// JWT 토큰의 클레임(Payload) 구조체
///
/// ## 클레임 구성
///
/// - `sub`: 표시 이름 (사용자명)
/// - `Role`: 사용자 역할 (인가에 사용)
/// - `email`: 사용자 이메일
/// - `UserId`: 정수 사용자 ID (인가에 사용)
/// - `kind`: 계정 종류 (`local` / `oauth`)
/// - `iss`, `aud`: 발급자 / 대상
/// - `iat`, `exp`: 발급 / 만료 시간 (Unix timestamp)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(rename = "Role")]
    pub role: Role,
    pub email: String,
    #[serde(rename = "UserId")]
    pub user_id: i64,
    pub kind: AccountKind,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// 토큰에 담길 계정 정보
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSubject {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub kind: AccountKind,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            kind: AccountKind::Local,
        }
    }
}

impl From<&OAuthUser> for TokenSubject {
    fn from(user: &OAuthUser) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            kind: AccountKind::OAuth,
        }
    }
}

/// 서명된 액세스 토큰과 만료 시각
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    /// 수명 (초)
    pub expires_in: i64,
}

/// 액세스 토큰 + 리프레시 토큰 쌍
///
/// 패스워드, OTP, 갱신 경로가 모두 이 형태로 응답합니다.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 항상 `"Bearer"`
    pub token_type: &'static str,
    /// 액세스 토큰 수명 (초)
    pub expires_in: i64,
    pub refresh_expires_at: DateTime<Utc>,
}
