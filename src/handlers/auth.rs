//! 인증 관련 HTTP 핸들러
//!
//! 토큰을 발급하는 엔드포인트는 JSON 본문과 함께 `access_token`/`refresh_token`
//! 쿠키를 설정합니다. 쿠키는 모두 HttpOnly, Secure, SameSite=None, Path=/ 입니다.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse, HttpResponseBuilder};
use serde_json::json;
use validator::Validate;

use crate::core::ServiceContainer;
use crate::domain::dto::users::request::{
    CreateUserRequest, LocalLoginRequest, OAuthCallbackQuery, OtpSendRequest, OtpVerifyRequest,
    RefreshTokenRequest,
};
use crate::domain::models::auth::OptionalUser;
use crate::domain::models::token::TokenPair;
use crate::errors::AppError;
use crate::middlewares::ACCESS_TOKEN_COOKIE;

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

fn auth_cookie(name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = auth_cookie(name, String::new(), 0);
    cookie.make_removal();
    cookie
}

fn with_token_cookies(
    mut builder: HttpResponseBuilder,
    container: &ServiceContainer,
    pair: &TokenPair,
) -> HttpResponseBuilder {
    let refresh_max_age = container.tokens.settings().refresh_ttl.num_seconds();
    builder
        .cookie(auth_cookie(ACCESS_TOKEN_COOKIE, pair.access_token.clone(), pair.expires_in))
        .cookie(auth_cookie(REFRESH_TOKEN_COOKIE, pair.refresh_token.clone(), refresh_max_age));
    builder
}

/// 쿠키를 먼저, 없으면 본문을 봅니다.
fn presented_refresh_token(req: &HttpRequest, body: Option<web::Json<RefreshTokenRequest>>) -> Option<String> {
    req.cookie(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| body.map(|b| b.into_inner().refresh_token))
}

/// 회원가입
///
/// # Endpoint
/// `POST /api/v1/auth/register`
#[post("/register")]
pub async fn register(
    container: web::Data<ServiceContainer>,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let created = container.users.register(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// 이메일/패스워드 로그인
///
/// # Endpoint
/// `POST /api/v1/auth/login`
#[post("/login")]
pub async fn local_login(
    container: web::Data<ServiceContainer>,
    payload: web::Json<LocalLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let pair = container
        .sessions
        .login(&payload.email, &payload.password)
        .await?;

    Ok(with_token_cookies(HttpResponse::Ok(), &container, &pair).json(pair))
}

/// OTP 발송
///
/// # Endpoint
/// `POST /api/v1/auth/otp/send`
#[post("/otp/send")]
pub async fn send_otp(
    container: web::Data<ServiceContainer>,
    payload: web::Json<OtpSendRequest>,
) -> Result<HttpResponse, AppError> {
    container.otp.request_otp(&payload.email).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "OTP sent successfully." })))
}

/// OTP 검증 및 토큰 발급
///
/// # Endpoint
/// `POST /api/v1/auth/otp/verify`
#[post("/otp/verify")]
pub async fn verify_otp(
    container: web::Data<ServiceContainer>,
    payload: web::Json<OtpVerifyRequest>,
) -> Result<HttpResponse, AppError> {
    let pair = container
        .sessions
        .verify_otp_and_issue(&payload.email, payload.code)
        .await?;

    Ok(with_token_cookies(HttpResponse::Ok(), &container, &pair).json(pair))
}

/// Google OAuth 로그인 URL 생성
///
/// # Endpoint
/// `GET /api/v1/auth/google/login`
#[get("/google/login")]
pub async fn google_login_url(container: web::Data<ServiceContainer>) -> Result<HttpResponse, AppError> {
    let response = container.google.login_url()?;
    Ok(HttpResponse::Ok().json(response))
}

/// Google OAuth 콜백
///
/// 성공하면 액세스 토큰 쿠키(설정 시 리프레시 토큰 쿠키 포함)를 심고
/// 프론트엔드로 리다이렉트합니다.
///
/// # Endpoint
/// `GET /api/v1/auth/google/callback?code={code}&state={state}`
#[get("/google/callback")]
pub async fn google_oauth_callback(
    container: web::Data<ServiceContainer>,
    query: web::Query<OAuthCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    if let Some(error) = &query.error {
        let description = query
            .error_description
            .as_deref()
            .unwrap_or("Google sign-in was cancelled or failed.");
        log::warn!("Google OAuth 에러: {} - {}", error, description);
        return Err(AppError::AuthenticationError(description.to_string()));
    }

    query
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let principal = container.google.authenticate(&query.code, &query.state).await?;
    let result = container.sessions.handle_oauth_callback(principal).await?;

    let mut response = HttpResponse::Found();
    response
        .insert_header((header::LOCATION, container.google_success_redirect().to_string()))
        .cookie(auth_cookie(ACCESS_TOKEN_COOKIE, result.access_token, result.expires_in));

    if let Some(refresh_token) = result.refresh_token {
        let max_age = container.tokens.settings().refresh_ttl.num_seconds();
        response.cookie(auth_cookie(REFRESH_TOKEN_COOKIE, refresh_token, max_age));
    }

    Ok(response.finish())
}

/// 리프레시 토큰 회전
///
/// # Endpoint
/// `POST /api/v1/auth/refresh`
#[post("/refresh")]
pub async fn refresh_tokens(
    container: web::Data<ServiceContainer>,
    req: HttpRequest,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, AppError> {
    let presented = presented_refresh_token(&req, body).unwrap_or_default();
    let pair = container.sessions.refresh_tokens(&presented).await?;

    Ok(with_token_cookies(HttpResponse::Ok(), &container, &pair).json(pair))
}

/// 로그아웃
///
/// 토큰이 없거나 이미 무효여도 성공으로 응답하고 쿠키를 지웁니다.
///
/// # Endpoint
/// `POST /api/v1/auth/logout`
#[post("/logout")]
pub async fn logout(
    container: web::Data<ServiceContainer>,
    req: HttpRequest,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, AppError> {
    let presented = presented_refresh_token(&req, body);
    container.sessions.logout(presented.as_deref()).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(removal_cookie(REFRESH_TOKEN_COOKIE))
        .json(json!({ "message": "Logged out successfully." })))
}

/// 현재 인증된 사용자 정보
///
/// # Endpoint
/// `GET /api/v1/auth/me`
#[get("/me")]
pub async fn get_current_user(
    container: web::Data<ServiceContainer>,
    user: OptionalUser,
) -> Result<HttpResponse, AppError> {
    let identity = container.sessions.current_identity(user.0.as_ref()).await?;
    Ok(HttpResponse::Ok().json(identity))
}
