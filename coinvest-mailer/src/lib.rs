pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{Error, LogMailer, MailClient, Result};

/// Message carrying a one-time code
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OtpMail {
    /// Recipient
    pub email: String,
    pub otp: String,
    pub subject: String,
    /// Text of the letter, already includes the code
    pub message: String,
}

/// Channel that delivers one-time codes to users
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, mail: OtpMail) -> Result<()>;
}
