pub mod api;
pub mod otp;
pub mod processor;
