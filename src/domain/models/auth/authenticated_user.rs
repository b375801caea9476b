use std::future::{ready, Ready};

use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Role;
use crate::domain::models::token::{AccountKind, TokenClaims};
use crate::errors::AppError;

/// JWT 토큰에서 추출된 사용자 정보
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// 사용자 고유 ID (`UserId` 클레임)
    pub user_id: i64,
    /// 표시 이름 (`sub` 클레임)
    pub username: String,
    pub email: String,
    pub role: Role,
    pub kind: AccountKind,
}

impl AuthenticatedUser {
    /// 특정 역할을 보유하고 있는지 확인
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// 여러 역할 중 하나라도 보유하고 있는지 확인
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// 관리자 권한을 보유하고 있는지 확인
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

impl From<TokenClaims> for AuthenticatedUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.sub,
            email: claims.email,
            role: claims.role,
            kind: claims.kind,
        }
    }
}

/// ActixWeb FromRequest trait 구현
impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::AuthenticationError(
                "Authentication required.".to_string(),
            )
            .into())),
        }
    }
}

/// 선택적 인증 사용자 추출자
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 1,
            username: "vinay".into(),
            email: "vinay@example.com".into(),
            role,
            kind: AccountKind::Local,
        }
    }

    #[test]
    fn test_authenticated_user_has_role() {
        let admin = user(Role::Admin);
        assert!(admin.has_role(Role::Admin));
        assert!(!admin.has_role(Role::User));
        assert!(admin.is_admin());
    }

    #[test]
    fn test_authenticated_user_has_any_role() {
        let engineer = user(Role::Engineer);
        assert!(engineer.has_any_role(&[Role::Admin, Role::Engineer]));
        assert!(!engineer.has_any_role(&[Role::Admin, Role::Manager]));
        assert!(!engineer.is_admin());
    }
}
