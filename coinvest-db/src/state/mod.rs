pub mod otp;
pub mod user;
pub mod withdraw;

use chrono::prelude::*;
use coinvest_auth::HasUserInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use otp::*;
pub use user::*;
pub use withdraw::*;

use super::update::otp::WithdrawalOtpInfo;
use super::update::signup::{SignupInfo, UserId};
use super::update::withdrawal::WithdrawalRequestInfo;
use super::update::{StateUpdate, UpdateBody};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct State {
    /// All known users of the system.
    pub users: HashMap<UserId, UserInfo>,
    /// Tracks when the state was last updated
    pub last_changed: NaiveDateTime,
}

impl Default for State {
    fn default() -> Self {
        State::new()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum StateUpdateErr {
    #[error("User with ID {0} is already signed up")]
    UserAlreadyExists(UserId),
    #[error("User with ID {0} is not known")]
    UserNotFound(UserId),
    #[error("Withdrawal request {0} is already recorded")]
    WithdrawalRequestDuplicate(WithdrawalRequestId),
}

impl State {
    pub fn new() -> Self {
        State {
            users: HashMap::new(),
            last_changed: Utc::now().naive_utc(),
        }
    }

    /// Rebuild state by replaying updates from oldest to newest
    pub fn collect<I>(updates: I) -> Result<Self, StateUpdateErr>
    where
        I: IntoIterator<Item = StateUpdate>,
    {
        let mut state = State::default();
        for upd in updates {
            state.apply_update(upd.created, upd.body)?;
        }
        Ok(state)
    }

    /// Apply an update event from persistent store
    pub fn apply_update(
        &mut self,
        created: NaiveDateTime,
        body: UpdateBody,
    ) -> Result<(), StateUpdateErr> {
        match body {
            UpdateBody::Signup(info) => self.with_signup(created, info)?,
            UpdateBody::WithdrawalOtp(info) => self.with_withdrawal_otp(info)?,
            UpdateBody::WithdrawalRequest(info) => self.with_withdrawal_request(created, info)?,
            UpdateBody::Snapshot(snapshot) => *self = snapshot,
        }
        self.last_changed = created;
        Ok(())
    }

    /// Apply signup state update
    fn with_signup(
        &mut self,
        timestamp: NaiveDateTime,
        signup: SignupInfo,
    ) -> Result<(), StateUpdateErr> {
        if self.users.contains_key(&signup.username) {
            return Err(StateUpdateErr::UserAlreadyExists(signup.username));
        }
        let user_id = signup.username.clone();
        self.users.insert(user_id, UserInfo::from((timestamp, signup)));
        Ok(())
    }

    /// Last write wins: any outstanding code is dropped
    fn with_withdrawal_otp(&mut self, info: WithdrawalOtpInfo) -> Result<(), StateUpdateErr> {
        let user = self
            .users
            .get_mut(&info.user)
            .ok_or_else(|| StateUpdateErr::UserNotFound(info.user.clone()))?;
        user.withdrawal_otp = Some(info.otp);
        Ok(())
    }

    fn with_withdrawal_request(
        &mut self,
        timestamp: NaiveDateTime,
        info: WithdrawalRequestInfo,
    ) -> Result<(), StateUpdateErr> {
        let user = self
            .users
            .get_mut(&info.user)
            .ok_or_else(|| StateUpdateErr::UserNotFound(info.user.clone()))?;
        if user.withdrawal_requests.iter().any(|r| r.id == info.id) {
            return Err(StateUpdateErr::WithdrawalRequestDuplicate(info.id));
        }
        user.withdrawal_requests
            .push(WithdrawalRequest::from((timestamp, info)));
        Ok(())
    }
}

impl HasUserInfo<UserInfo> for State {
    fn get_user_info(&self, user_id: &str) -> Option<UserInfo> {
        self.users.get(user_id).cloned()
    }
}
