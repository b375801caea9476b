//! 라우트 구성
//!
//! ```text
//! /health                      공개
//! /api/v1/auth/*               선택 인증 (토큰이 있으면 사용자 정보 주입)
//! /api/v1/users/{id}, /me/tour 인증 필수
//! /api/v1/users/*              그 밖의 관리 엔드포인트는 Admin 전용
//! ```

use actix_web::web;
use serde_json::json;

use crate::domain::entities::Role;
use crate::errors::AppError;
use crate::handlers;
use crate::middlewares::AuthMiddleware;

pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.service(health_check);

    configure_auth_routes(cfg);
    configure_user_routes(cfg);
}

/// 잘못된 JSON 본문도 `{"error": "..."}` 형식으로 응답합니다.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(format!("Invalid request body: {}", err)).into())
}

fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .wrap(AuthMiddleware::optional())
            .service(handlers::auth::register)
            .service(handlers::auth::local_login)
            .service(handlers::auth::send_otp)
            .service(handlers::auth::verify_otp)
            .service(handlers::auth::google_login_url)
            .service(handlers::auth::google_oauth_callback)
            .service(handlers::auth::refresh_tokens)
            .service(handlers::auth::logout)
            .service(handlers::auth::get_current_user),
    );
}

fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    // `/me/tour`는 `/{user_id}`보다 먼저 등록
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(AuthMiddleware::required())
            .service(handlers::users::get_tour_status)
            .service(handlers::users::complete_tour)
            .service(handlers::users::get_user)
            .service(
                web::scope("")
                    .wrap(AuthMiddleware::required_with_role(Role::Admin))
                    .service(handlers::users::list_users)
                    .service(handlers::users::update_user)
                    .service(handlers::users::delete_user)
                    .service(handlers::users::update_role),
            ),
    );
}

#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};

    use super::*;
    use crate::handlers::test_support::test_container;
    use crate::services::email::ConsoleEmailSender;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(configure_all_routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let container = test_container(Arc::new(ConsoleEmailSender::new()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(container))
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
