use serde::{Deserialize, Serialize};

/// It is unique user ID whithin the system. For e-mail signups it is the e-mail address.
pub type UserId = String;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct SignupInfo {
    /// It is unique user ID whithin the system.
    pub username: UserId,
    /// Where OTP codes are delivered
    pub email: String,
    /// Contains additional info that required to authentificated user in future.
    pub auth: SignupAuth,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum SignupAuth {
    /// User hashed and salted password
    Password(String),
}
