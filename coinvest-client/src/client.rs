use coinvest_api::types::*;
use log::*;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Reqwesting server error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("JSON encoding/decoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Server replied {status}: {message}")]
    Server { status: StatusCode, message: String },
}

impl Error {
    /// HTTP status of the failed reply, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Server { status, .. } => Some(*status),
            Error::Reqwest(e) => e.status(),
            Error::Json(_) => None,
        }
    }
}

/// Alias for a `Result` with the error type `self::Error`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client of the public API. Keeps the session cookie between calls.
pub struct CoinvestClient {
    pub client: reqwest::Client,
    pub server: String,
}

impl CoinvestClient {
    pub fn new(url: &str) -> Result<Self> {
        Ok(CoinvestClient {
            client: reqwest::Client::builder().cookie_store(true).build()?,
            server: url.trim_end_matches('/').to_owned(),
        })
    }

    async fn execute<T: DeserializeOwned>(&self, path: &str, builder: RequestBuilder) -> Result<T> {
        let response = self.client.execute(builder.build()?).await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("Response {path}: {status} {text}");
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(Error::Server { status, message });
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let endpoint = format!("{}{}", self.server, path);
        self.execute(path, self.client.get(endpoint)).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: Option<&B>) -> Result<T> {
        let endpoint = format!("{}{}", self.server, path);
        let mut builder = self.client.post(endpoint);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(path, builder).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.get("/ping").await
    }

    pub async fn signup_email(&self, req: SignupEmail) -> Result<()> {
        self.post("/signup/email", Some(&req)).await
    }

    pub async fn signin_email(&self, req: SigninEmail) -> Result<()> {
        self.post("/signin/email", Some(&req)).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.post::<(), _>("/logout", None).await
    }

    pub async fn request_withdrawal_otp(&self) -> Result<ActionResponse> {
        self.post::<(), _>("/withdrawal/otp", None).await
    }

    pub async fn submit_withdrawal(&self, req: WithdrawalSubmission) -> Result<WithdrawalResponse> {
        self.post("/withdrawal", Some(&req)).await
    }

    pub async fn withdrawal_history(&self) -> Result<Vec<WithdrawalHistoryItem>> {
        self.get("/withdrawal/history").await
    }
}
