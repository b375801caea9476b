pub mod otp_repo;

pub use otp_repo::OtpRepository;
