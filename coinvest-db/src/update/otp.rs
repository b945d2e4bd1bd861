use serde::{Deserialize, Serialize};

use crate::state::WithdrawalOtp;
use crate::update::signup::UserId;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct WithdrawalOtpInfo {
    /// Owner of the code
    pub user: UserId,
    /// The code with its validity window
    pub otp: WithdrawalOtp,
}
