use crate::update::{signup::UserId, withdrawal::WithdrawalRequestInfo};
use coinvest_api::types::WithdrawalHistoryItem;

use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// It is unique withdrawal request ID whithin the system.
pub type WithdrawalRequestId = Uuid;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct WithdrawalRequest {
    /// Request ID
    pub id: WithdrawalRequestId,
    /// User which initiated the request
    pub user: UserId,
    /// Receiving wallet
    pub wallet_address: String,
    /// When the request was created
    pub created_at: NaiveDateTime,
    /// Amount to transfer
    pub amount: f64,
}

impl From<(NaiveDateTime, WithdrawalRequestInfo)> for WithdrawalRequest {
    fn from(value: (NaiveDateTime, WithdrawalRequestInfo)) -> Self {
        let (created_at, info) = value;
        WithdrawalRequest {
            id: info.id,
            user: info.user,
            wallet_address: info.wallet_address,
            created_at,
            amount: info.amount,
        }
    }
}

impl From<WithdrawalRequest> for WithdrawalHistoryItem {
    fn from(value: WithdrawalRequest) -> Self {
        WithdrawalHistoryItem {
            id: value.id,
            amount: value.amount,
            wallet_address: value.wallet_address,
            created_at: value.created_at,
        }
    }
}
