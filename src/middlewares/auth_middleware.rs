//! 인증 미들웨어 팩토리
//!
//! 스코프 또는 리소스 단위로 `wrap`하여 사용합니다.
//!
//! ```rust,ignore
//! web::scope("/users")
//!     .wrap(AuthMiddleware::required())
//!     .service(
//!         web::resource("/{id}/role")
//!             .wrap(AuthMiddleware::required_with_role(Role::Admin))
//!             .route(web::put().to(update_role)),
//!     )
//! ```

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::domain::entities::Role;
use crate::domain::models::auth::{AuthMode, RequiredRole};
use crate::middlewares::auth_inner::AuthMiddlewareService;

pub struct AuthMiddleware {
    mode: AuthMode,
    required_role: Option<RequiredRole>,
}

impl AuthMiddleware {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            required_role: None,
        }
    }

    pub fn new_with_role(mode: AuthMode, required_role: RequiredRole) -> Self {
        Self {
            mode,
            required_role: Some(required_role),
        }
    }

    /// 유효한 토큰이 없으면 401
    pub fn required() -> Self {
        Self::new(AuthMode::Required)
    }

    /// 토큰이 있으면 검증해서 사용자 정보를 넣고, 없거나 틀려도 통과
    pub fn optional() -> Self {
        Self::new(AuthMode::Optional)
    }

    /// 토큰이 없으면 401, 역할이 다르면 403
    pub fn required_with_role(role: Role) -> Self {
        Self::new_with_role(AuthMode::Required, RequiredRole::Single(role))
    }

    pub fn required_with_roles(roles: Vec<Role>) -> Self {
        Self::new_with_role(AuthMode::Required, RequiredRole::Any(roles))
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode.clone(),
            required_role: self.required_role.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    use super::*;
    use crate::config::{AuthSettings, GoogleOAuthConfig, OtpConfig};
    use crate::core::ServiceContainer;
    use crate::domain::models::auth::{AuthenticatedUser, OptionalUser};
    use crate::domain::models::token::{AccountKind, TokenSubject};
    use crate::repositories::InMemoryCredentialStore;
    use crate::services::auth::PasswordHasher;
    use crate::services::email::ConsoleEmailSender;

    fn container() -> ServiceContainer {
        ServiceContainer::with_settings(
            AuthSettings::with_secret("middleware-test-secret"),
            PasswordHasher::new(4),
            OtpConfig::default(),
            GoogleOAuthConfig::default(),
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(ConsoleEmailSender::new()),
        )
    }

    fn token_for(container: &ServiceContainer, role: Role) -> String {
        let subject = TokenSubject {
            user_id: 7,
            username: "vinay".into(),
            email: "vinay@test.com".into(),
            role,
            kind: AccountKind::Local,
        };
        container
            .tokens
            .issue_access_token(&subject, chrono::Duration::minutes(5))
            .unwrap()
            .token
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.user_id.to_string())
    }

    async fn maybe(user: OptionalUser) -> HttpResponse {
        HttpResponse::Ok().body(if user.0.is_some() { "user" } else { "anonymous" })
    }

    #[actix_web::test]
    async fn test_required_accepts_bearer_and_cookie() {
        let container = container();
        let token = token_for(&container, Role::User);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(container))
                .service(web::scope("/p").wrap(AuthMiddleware::required()).route("", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/p")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "7");

        let req = test::TestRequest::get()
            .uri("/p")
            .cookie(actix_web::cookie::Cookie::new("access_token", token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/p").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/p")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_role_requirement_returns_forbidden() {
        let container = container();
        let user_token = token_for(&container, Role::User);
        let admin_token = token_for(&container, Role::Admin);
        let app = test::init_service(
            App::new().app_data(web::Data::new(container)).service(
                web::scope("/admin")
                    .wrap(AuthMiddleware::required_with_role(Role::Admin))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", user_token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_any_of_roles() {
        let container = container();
        let manager_token = token_for(&container, Role::Manager);
        let engineer_token = token_for(&container, Role::Engineer);
        let app = test::init_service(
            App::new().app_data(web::Data::new(container)).service(
                web::scope("/ops")
                    .wrap(AuthMiddleware::required_with_roles(vec![Role::Admin, Role::Manager]))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ops")
            .insert_header(("Authorization", format!("Bearer {}", manager_token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/ops")
            .insert_header(("Authorization", format!("Bearer {}", engineer_token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_optional_passes_without_token() {
        let container = container();
        let token = token_for(&container, Role::User);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(container))
                .service(web::scope("/o").wrap(AuthMiddleware::optional()).route("", web::get().to(maybe))),
        )
        .await;

        let req = test::TestRequest::get().uri("/o").to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");

        let req = test::TestRequest::get()
            .uri("/o")
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");

        let req = test::TestRequest::get()
            .uri("/o")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "user");
    }
}
