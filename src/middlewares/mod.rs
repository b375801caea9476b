//! 미들웨어 모듈
//!
//! ### 인증 미들웨어 (AuthMiddleware)
//! - `Authorization: Bearer` 헤더 또는 `access_token` 쿠키의 JWT 검증
//! - 사용자 정보를 request extension에 저장 ([`crate::domain::models::auth::AuthenticatedUser`])
//! - 강제(Required) / 선택(Optional) 인증 모드, 역할 요구 조건 지원
//!
//! 토큰 검증에는 앱 데이터로 등록된 `ServiceContainer`의 `TokenService`를 사용합니다.
//!
//! ```rust,ignore
//! App::new()
//!     .app_data(web::Data::new(container))
//!     .service(
//!         web::scope("/api/v1/users")
//!             .wrap(AuthMiddleware::required())
//!             .configure(users_routes),
//!     )
//! ```

pub mod auth_middleware;
mod auth_inner;

pub use auth_inner::ACCESS_TOKEN_COOKIE;
pub use auth_middleware::AuthMiddleware;
