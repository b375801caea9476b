pub mod user_response;
pub mod google_oauth_response;

pub use user_response::*;
pub use google_oauth_response::*;
