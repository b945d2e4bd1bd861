pub mod auth;
pub mod withdrawal;

use auth::*;
use figment::Figment;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::{Mutex, Notify};
use withdrawal::*;

use rocket::fairing::AdHoc;
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, Build, Rocket};
use rocket_okapi::{openapi, openapi_get_routes, swagger_ui::*};

use coinvest_api::error::{self, ErrorMessage};
use coinvest_db::state::State as DbState;
use coinvest_db::update::StateUpdate;
use coinvest_mailer::OtpMailer;

use crate::otp::OtpGenerator;
use crate::processor::WithdrawalProcessor;

#[openapi(tag = "ping")]
#[get("/ping")]
fn ping() -> Json<()> {
    Json(())
}

/// Body that is not JSON at all
#[catch(400)]
fn bad_request() -> ErrorMessage {
    error::Error::MalformedBody.into()
}

/// JSON that doesn't fit the expected shape
#[catch(422)]
fn unprocessable() -> ErrorMessage {
    let mut msg: ErrorMessage = error::Error::MalformedBody.into();
    msg.status = 422;
    msg
}

/// Assemble the public API without launching it
pub fn build_api(
    state: Arc<Mutex<DbState>>,
    update_sender: mpsc::Sender<StateUpdate>,
    mailer: Arc<dyn OtpMailer>,
    otp_generator: Arc<dyn OtpGenerator>,
    processor: Arc<dyn WithdrawalProcessor>,
    start_notify: Arc<Notify>,
    api_config: Figment,
) -> Rocket<Build> {
    let on_ready = AdHoc::on_liftoff("API Start!", |_| {
        Box::pin(async move {
            info!("Public API is ready");
            start_notify.notify_one();
        })
    });
    rocket::custom(api_config)
        .mount(
            "/",
            openapi_get_routes![
                ping,
                signup_email,
                signin_email,
                logout,
                request_withdrawal_otp,
                submit_withdrawal,
                get_withdrawal_history
            ],
        )
        .mount(
            "/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .register("/", catchers![bad_request, unprocessable])
        .manage(state)
        .manage(update_sender)
        .manage(mailer)
        .manage(otp_generator)
        .manage(processor)
        .attach(on_ready)
}

pub async fn serve_api(
    state: Arc<Mutex<DbState>>,
    update_sender: mpsc::Sender<StateUpdate>,
    mailer: Arc<dyn OtpMailer>,
    otp_generator: Arc<dyn OtpGenerator>,
    processor: Arc<dyn WithdrawalProcessor>,
    start_notify: Arc<Notify>,
    api_config: Figment,
) -> Result<(), rocket::Error> {
    let _ = build_api(
        state,
        update_sender,
        mailer,
        otp_generator,
        processor,
        start_notify,
        api_config,
    )
    .launch()
    .await?;
    Ok(())
}
