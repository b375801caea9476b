//! 패스워드 해싱
//!
//! bcrypt로 해시/검증합니다. 해싱은 CPU를 오래 점유하므로 비동기 경로에서는
//! `actix_web::web::block`으로 블로킹 풀에 넘깁니다.

use actix_web::web;

use crate::errors::{AppResult, ErrorContext};

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// `cost`는 bcrypt 허용 범위(4-31) 안이어야 합니다.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// 호출마다 새로운 솔트로 해시합니다.
    pub fn hash_blocking(&self, plaintext: &str) -> AppResult<String> {
        bcrypt::hash(plaintext, self.cost)
            .context("비밀번호 해싱 실패")
    }

    /// 저장된 해시가 손상된 경우에도 에러 대신 `false`를 반환합니다.
    pub fn verify_blocking(plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(plaintext, hash) {
            Ok(matched) => matched,
            Err(e) => {
                log::warn!("저장된 비밀번호 해시 검증 불가: {}", e);
                false
            }
        }
    }

    pub async fn hash(&self, plaintext: &str) -> AppResult<String> {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();

        web::block(move || hasher.hash_blocking(&plaintext))
            .await
            .context("해싱 작업 실행 실패")?
    }

    pub async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();

        match web::block(move || Self::verify_blocking(&plaintext, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                log::error!("비밀번호 검증 작업 실행 실패: {}", e);
                false
            }
        }
    }
}
