use super::otp::WithdrawalOtp;
use super::withdraw::WithdrawalRequest;
use crate::update::signup::{SignupAuth, SignupInfo, UserId};
use chrono::prelude::*;
use coinvest_api::types::WithdrawalHistoryItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct UserInfo {
    /// It is unique user ID whithin the system.
    pub username: UserId,
    /// Destination of OTP codes
    pub email: String,
    /// Contains additional info that required to authentificated user in future.
    pub auth: SignupAuth,
    /// When the user was created
    pub created_at: NaiveDateTime,
    /// The only valid withdrawal code, if any was issued
    pub withdrawal_otp: Option<WithdrawalOtp>,
    /// Withdrawal requests in order of submission
    pub withdrawal_requests: Vec<WithdrawalRequest>,
}

impl UserInfo {
    pub fn new(username: &str, email: &str, auth: SignupAuth, created_at: NaiveDateTime) -> Self {
        UserInfo {
            username: username.to_owned(),
            email: email.to_owned(),
            auth,
            created_at,
            withdrawal_otp: None,
            withdrawal_requests: vec![],
        }
    }

    /// Withdrawal history, newest first
    pub fn withdrawal_history(&self) -> Vec<WithdrawalHistoryItem> {
        self.withdrawal_requests
            .iter()
            .rev()
            .cloned()
            .map(|r| r.into())
            .collect()
    }
}

impl From<(NaiveDateTime, SignupInfo)> for UserInfo {
    fn from(value: (NaiveDateTime, SignupInfo)) -> Self {
        UserInfo::new(&value.1.username, &value.1.email, value.1.auth, value.0)
    }
}
