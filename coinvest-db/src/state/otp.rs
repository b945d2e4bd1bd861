use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How long an issued withdrawal code stays valid
pub const OTP_VALIDITY_MINUTES: i64 = 5;

/// One outstanding withdrawal code of a user
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct WithdrawalOtp {
    pub code: String,
    /// When the code was issued
    pub created_at: NaiveDateTime,
    /// Always `created_at` plus `OTP_VALIDITY_MINUTES`
    pub expires_at: NaiveDateTime,
}

impl WithdrawalOtp {
    pub fn new(code: &str, created_at: NaiveDateTime) -> Self {
        WithdrawalOtp {
            code: code.to_owned(),
            created_at,
            expires_at: created_at + Self::validity(),
        }
    }

    pub fn validity() -> Duration {
        Duration::minutes(OTP_VALIDITY_MINUTES)
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_expiry_window() {
        let now = Utc::now().naive_utc();
        let otp = WithdrawalOtp::new("123456", now);
        assert_eq!(otp.expires_at - otp.created_at, Duration::milliseconds(300_000));
        assert!(!otp.is_expired(now));
        assert!(!otp.is_expired(now + Duration::seconds(299)));
        assert!(otp.is_expired(now + Duration::minutes(5)));
    }
}
