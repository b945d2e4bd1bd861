use chrono::NaiveDateTime;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone)]
pub struct SignupEmail {
    /// Unique user name. For e-mail signups it is the e-mail address
    #[schemars(example = "example_user")]
    pub user: String,
    /// Password
    #[schemars(example = "example_password")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone)]
pub struct SigninEmail {
    #[schemars(example = "example_user")]
    pub user: String,
    #[schemars(example = "example_password")]
    pub password: String,
}

fn example_user() -> &'static str {
    "user@mail.com"
}

fn example_password() -> &'static str {
    "123456"
}

/// Generic reply of actions that don't return a payload
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, PartialEq)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

/// Withdrawal as it comes from the client. Both fields are checked for presence only.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Default, PartialEq)]
pub struct WithdrawalSubmission {
    pub amount: Option<f64>,
    #[serde(rename = "walletAddress")]
    pub wallet_address: Option<String>,
}

impl WithdrawalSubmission {
    /// Read a raw JSON body. Fields of a wrong type count as absent.
    pub fn from_json(value: &serde_json::Value) -> Self {
        WithdrawalSubmission {
            amount: value.get("amount").and_then(|a| a.as_f64()),
            wallet_address: value
                .get("walletAddress")
                .and_then(|a| a.as_str())
                .map(|a| a.to_owned()),
        }
    }

    /// Returns amount and address when both are present, non-zero and non-empty
    pub fn required_fields(self) -> Option<(f64, String)> {
        let amount = self.amount.filter(|a| *a != 0.0 && !a.is_nan())?;
        let address = self.wallet_address.filter(|a| !a.is_empty())?;
        Some((amount, address))
    }
}

/// Reply of withdrawal processing
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, PartialEq)]
pub struct WithdrawalResponse {
    pub success: bool,
    pub message: String,
    /// Identifier of recorded withdrawal request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, PartialEq)]
pub struct WithdrawalHistoryItem {
    pub id: Uuid,
    pub amount: f64,
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDateTime,
}
