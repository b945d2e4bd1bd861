use serde::{Deserialize, Serialize};

use crate::state::withdraw::WithdrawalRequestId;
use crate::update::signup::UserId;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct WithdrawalRequestInfo {
    /// Request ID
    pub id: WithdrawalRequestId,
    /// User which initiated withdrawal request
    pub user: UserId,
    /// Amount to transfer
    pub amount: f64,
    /// Receiving wallet
    pub wallet_address: String,
}
