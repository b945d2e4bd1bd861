use async_trait::async_trait;
use coinvest_api::types::WithdrawalResponse;
use coinvest_db::update::results::UpdateFailure;
use coinvest_db::update::signup::UserId;
use coinvest_db::update::withdrawal::WithdrawalRequestInfo;
use coinvest_db::update::{commit_update, StateUpdate, UpdateBody};
use log::*;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Withdrawal that passed the gate
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalCommand {
    pub user: UserId,
    pub amount: f64,
    pub wallet_address: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to record withdrawal request: {0}")]
    Update(#[from] UpdateFailure),
}

/// Takes over withdrawals once the gate accepted them. The reply is sent to the client as is.
#[async_trait]
pub trait WithdrawalProcessor: Send + Sync {
    async fn process(&self, command: WithdrawalCommand) -> Result<WithdrawalResponse, Error>;
}

/// Records withdrawal requests in the user's ledger
#[derive(Clone)]
pub struct LedgerWithdrawalProcessor {
    updater: mpsc::Sender<StateUpdate>,
}

impl LedgerWithdrawalProcessor {
    pub fn new(updater: mpsc::Sender<StateUpdate>) -> Self {
        LedgerWithdrawalProcessor { updater }
    }
}

#[async_trait]
impl WithdrawalProcessor for LedgerWithdrawalProcessor {
    async fn process(&self, command: WithdrawalCommand) -> Result<WithdrawalResponse, Error> {
        if command.amount <= 0.0 {
            return Ok(WithdrawalResponse {
                success: false,
                message: "Withdrawal amount must be positive".to_owned(),
                id: None,
            });
        }
        let id = Uuid::new_v4();
        let info = WithdrawalRequestInfo {
            id,
            user: command.user,
            amount: command.amount,
            wallet_address: command.wallet_address,
        };
        info!(
            "Recording withdrawal {id} of {} to {} for {}",
            info.amount, info.wallet_address, info.user
        );
        commit_update(
            &self.updater,
            StateUpdate::new(UpdateBody::WithdrawalRequest(info)),
        )
        .await?;
        Ok(WithdrawalResponse {
            success: true,
            message: "Withdrawal request submitted".to_owned(),
            id: Some(id),
        })
    }
}
