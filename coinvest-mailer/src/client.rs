use async_trait::async_trait;
use log::*;
use serde::Serialize;
use thiserror::Error;

use crate::{OtpMail, OtpMailer};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Requesting mail provider error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Alias for a `Result` with the error type `self::Error`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Client of the transactional e-mail provider
#[derive(Clone)]
pub struct MailClient {
    pub client: reqwest::Client,
    pub server: String,
    api_key: String,
    sender: String,
}

impl MailClient {
    pub fn new(url: &str, api_key: &str, sender: &str) -> Self {
        MailClient {
            client: reqwest::Client::new(),
            server: url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            sender: sender.to_owned(),
        }
    }

    fn build_send(&self, to: &str, subject: &str, text: &str) -> Result<reqwest::Request> {
        let path = "/send";
        let endpoint = format!("{}{}", self.server, path);
        let body = SendRequest {
            from: &self.sender,
            to,
            subject,
            text,
        };
        Ok(self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .build()?)
    }

    /// Send plain text letter. Any non-success status is an error.
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> Result<()> {
        let request = self.build_send(to, subject, text)?;
        let response = self
            .client
            .execute(request)
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!("Response send: {}", response);
        Ok(())
    }
}

#[async_trait]
impl OtpMailer for MailClient {
    async fn send_otp(&self, mail: OtpMail) -> Result<()> {
        self.send(&mail.email, &mail.subject, &mail.message).await
    }
}

/// Writes letters to the log instead of sending them. For local runs only.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, mail: OtpMail) -> Result<()> {
        info!("Mail to {} [{}]: {}", mail.email, mail.subject, mail.message);
        Ok(())
    }
}
