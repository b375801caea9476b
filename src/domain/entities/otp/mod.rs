pub mod user_otp;

pub use user_otp::OtpRecord;
