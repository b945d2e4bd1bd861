use std::sync::Arc;

use chrono::prelude::*;
use coinvest_api::error;
use coinvest_api::types as api;
use coinvest_auth::{require_auth, require_auth_user};
use coinvest_db::state::{State as DbState, UserInfo, WithdrawalOtp};
use coinvest_db::update::otp::WithdrawalOtpInfo;
use coinvest_db::update::{commit_update, StateUpdate, UpdateBody};
use coinvest_mailer::OtpMailer;
use log::*;
use rocket::http::CookieJar;
use rocket::serde::json::{Json, Value};
use rocket::{get, post, State};
use rocket_okapi::openapi;
use tokio::sync::{mpsc, Mutex};

use crate::otp::{withdrawal_otp_mail, OtpGenerator};
use crate::processor::{WithdrawalCommand, WithdrawalProcessor};

/// Issue a fresh withdrawal code for the current user and mail it.
///
/// The code is stored before it is sent. If the mail provider fails the new
/// code stays stored and the previous one is gone.
#[openapi(tag = "withdrawal")]
#[post("/withdrawal/otp")]
pub async fn request_withdrawal_otp(
    cookies: &CookieJar<'_>,
    state: &State<Arc<Mutex<DbState>>>,
    updater: &State<mpsc::Sender<StateUpdate>>,
    otp_generator: &State<Arc<dyn OtpGenerator>>,
    mailer: &State<Arc<dyn OtpMailer>>,
) -> error::Result<Json<api::ActionResponse>> {
    require_auth_user(cookies, state, |user: UserInfo| async move {
        let now = Utc::now().naive_utc();
        let otp = WithdrawalOtp::new(&otp_generator.generate(), now);
        let mail = withdrawal_otp_mail(&user.email, &otp.code);
        let upd = StateUpdate::at(
            now,
            UpdateBody::WithdrawalOtp(WithdrawalOtpInfo {
                user: user.username.clone(),
                otp,
            }),
        );
        if let Err(e) = commit_update(updater, upd).await {
            error!("Failed to store withdrawal OTP of {}: {e}", user.username);
            return Err(error::Error::InternalServerError.into());
        }
        if let Err(e) = mailer.send_otp(mail).await {
            error!("Failed to send withdrawal OTP to {}: {e}", user.email);
            return Err(error::Error::OtpDeliveryFailed.into());
        }
        info!("Withdrawal OTP is sent to {}", user.username);
        Ok(Json(api::ActionResponse {
            success: true,
            message: "OTP sent to your email".to_owned(),
        }))
    })
    .await
}

/// Accept a withdrawal and hand it to the processor.
///
/// Only presence of the fields is checked here. No OTP is verified. The body
/// is read as raw JSON so that fields of a wrong type end up as missing ones.
#[openapi(tag = "withdrawal")]
#[post("/withdrawal", data = "<submission>")]
pub async fn submit_withdrawal(
    cookies: &CookieJar<'_>,
    processor: &State<Arc<dyn WithdrawalProcessor>>,
    submission: Json<Value>,
) -> error::Result<Json<api::WithdrawalResponse>> {
    require_auth(cookies, |user_id| async move {
        let (amount, wallet_address) = api::WithdrawalSubmission::from_json(&submission)
            .required_fields()
            .ok_or(error::Error::MissingWithdrawalFields)?;
        let command = WithdrawalCommand {
            user: user_id,
            amount,
            wallet_address,
        };
        match processor.process(command).await {
            Ok(resp) => Ok(Json(resp)),
            Err(e) => {
                error!("Withdrawal processing failed: {e}");
                Err(error::Error::InternalServerError.into())
            }
        }
    })
    .await
}

#[openapi(tag = "withdrawal")]
#[get("/withdrawal/history")]
pub async fn get_withdrawal_history(
    cookies: &CookieJar<'_>,
    state: &State<Arc<Mutex<DbState>>>,
) -> error::Result<Json<Vec<api::WithdrawalHistoryItem>>> {
    require_auth_user(cookies, state, |user: UserInfo| async move {
        Ok(Json(user.withdrawal_history()))
    })
    .await
}
