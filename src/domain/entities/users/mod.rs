pub mod role;
pub mod user;
pub mod oauth_user;

pub use role::Role;
pub use user::User;
pub use oauth_user::OAuthUser;
