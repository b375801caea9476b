//! 사용자 관리 HTTP 핸들러
//!
//! 모든 엔드포인트는 인증이 필요합니다. 목록 조회, 수정, 삭제, 역할 변경은
//! `Admin` 역할 전용이며 라우트 설정에서 역할 미들웨어로 묶입니다.
//!
//! # Endpoints
//!
//! | Method | Path | 권한 |
//! |--------|------|------|
//! | GET | `/api/v1/users` | Admin |
//! | GET | `/api/v1/users/{id}` | 인증 |
//! | PUT | `/api/v1/users/{id}` | Admin |
//! | DELETE | `/api/v1/users/{id}` | Admin |
//! | PUT | `/api/v1/users/{id}/role` | Admin |
//! | GET | `/api/v1/users/me/tour` | 인증 (로컬 계정) |
//! | POST | `/api/v1/users/me/tour` | 인증 (로컬 계정) |

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::core::ServiceContainer;
use crate::domain::dto::users::request::{UpdateRoleRequest, UpdateUserRequest};
use crate::domain::models::auth::AuthenticatedUser;
use crate::domain::models::token::AccountKind;
use crate::errors::AppError;

/// 투어 상태는 로컬 계정에만 있습니다.
fn local_account_id(user: &AuthenticatedUser) -> Result<i64, AppError> {
    match user.kind {
        AccountKind::Local => Ok(user.user_id),
        AccountKind::OAuth => Err(AppError::NotFound("User not found.".to_string())),
    }
}

#[get("")]
pub async fn list_users(container: web::Data<ServiceContainer>) -> Result<HttpResponse, AppError> {
    let users = container.users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/me/tour")]
pub async fn get_tour_status(
    container: web::Data<ServiceContainer>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let status = container.users.tour_status(local_account_id(&user)?).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[post("/me/tour")]
pub async fn complete_tour(
    container: web::Data<ServiceContainer>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let status = container.users.complete_tour(local_account_id(&user)?).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[get("/{user_id}")]
pub async fn get_user(
    container: web::Data<ServiceContainer>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = container.users.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/{user_id}")]
pub async fn update_user(
    container: web::Data<ServiceContainer>,
    path: web::Path<i64>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let updated = container
        .users
        .update_user(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{user_id}")]
pub async fn delete_user(
    container: web::Data<ServiceContainer>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    container.users.delete_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully." })))
}

#[put("/{user_id}/role")]
pub async fn update_role(
    container: web::Data<ServiceContainer>,
    path: web::Path<i64>,
    payload: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = container
        .users
        .update_role(path.into_inner(), &payload.role)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use super::*;
    use crate::config::AdminSeed;
    use crate::handlers::test_support::test_container;
    use crate::routes::configure_all_routes;
    use crate::services::email::ConsoleEmailSender;

    macro_rules! login {
        ($app:expr, $email:expr, $password:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": $email, "password": $password }))
                .to_request();
            let pair: Value = test::read_body_json(test::call_service($app, req).await).await;
            pair["access_token"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn test_admin_routes_require_admin_role() {
        let container = test_container(Arc::new(ConsoleEmailSender::new()));
        container
            .users
            .seed_default_admin(Some(&AdminSeed {
                username: "admin".into(),
                email: "admin@test.com".into(),
                password: "Admin@123".into(),
            }))
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(container))
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "username": "vinay_21", "email": "vinay@test.com", "password": "Vinay@123" }))
            .to_request();
        let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let vinay_id = created["id"].as_i64().unwrap();

        let user_token = login!(&app, "vinay@test.com", "Vinay@123");
        let admin_token = login!(&app, "admin@test.com", "Admin@123");
        let bearer = |t: &str| ("Authorization", format!("Bearer {}", t));

        let req = test::TestRequest::get().uri("/api/v1/users").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(bearer(&user_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(bearer(&admin_token))
            .to_request();
        let users: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(users.as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", vinay_id))
            .insert_header(bearer(&user_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/role", vinay_id))
            .insert_header(bearer(&user_token))
            .set_json(json!({ "role": "Admin" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/role", vinay_id))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "role": "Wizard" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}/role", vinay_id))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "role": "Manager" }))
            .to_request();
        let updated: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(updated["role"], "Manager");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", vinay_id))
            .insert_header(bearer(&admin_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", vinay_id))
            .insert_header(bearer(&admin_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_tour_status_for_current_user() {
        let container = test_container(Arc::new(ConsoleEmailSender::new()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(container))
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "username": "vinay_21", "email": "vinay@test.com", "password": "Vinay@123" }))
            .to_request();
        test::call_service(&app, req).await;
        let token = login!(&app, "vinay@test.com", "Vinay@123");

        let req = test::TestRequest::get()
            .uri("/api/v1/users/me/tour")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let status: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(status["tour_completed"], false);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/me/tour")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let status: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(status["tour_completed"], true);
    }
}
