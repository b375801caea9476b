//! 사용자 응답 DTO

use serde::{Deserialize, Serialize};

use crate::domain::entities::{OAuthUser, Role, User};
use crate::domain::models::token::AccountKind;

/// 외부로 노출되는 계정 정보
///
/// 해시와 토큰 등 민감한 필드는 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub kind: AccountKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour_completed: Option<bool>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            kind: AccountKind::Local,
            tour_completed: Some(user.tour_completed),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&OAuthUser> for UserResponse {
    fn from(user: &OAuthUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            kind: AccountKind::OAuth,
            tour_completed: None,
        }
    }
}

/// 투어 완료 상태 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourStatusResponse {
    pub tour_completed: bool,
}
