pub mod create_user;
pub mod update_user;
pub mod auth_request;

pub use create_user::CreateUserRequest;
pub use update_user::{UpdateRoleRequest, UpdateUserRequest};
pub use auth_request::*;
