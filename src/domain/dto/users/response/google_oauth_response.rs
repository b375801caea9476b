use serde::Serialize;

/// Google 로그인 URL 응답
#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginUrlResponse {
    pub auth_url: String,
    pub state: String,
}
