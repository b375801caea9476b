pub mod user_repo;
pub mod oauth_user_repo;

pub use user_repo::UserRepository;
pub use oauth_user_repo::OAuthUserRepository;
