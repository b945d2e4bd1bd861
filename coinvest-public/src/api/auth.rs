use coinvest_api::error;
use coinvest_api::types as api;
use coinvest_auth::{clear_session, require_auth, set_session};
use coinvest_db::state::*;
use coinvest_db::update::results::UpdateFailure;
use coinvest_db::update::signup::*;
use coinvest_db::update::*;
use log::*;
use pwhash::bcrypt;
use rocket::http::CookieJar;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State as RState;
use rocket_okapi::openapi;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

#[openapi(tag = "auth")]
#[post("/signup/email", data = "<data>")]
pub async fn signup_email(
    state: &RState<Arc<Mutex<State>>>,
    updater: &RState<mpsc::Sender<StateUpdate>>,
    data: Json<api::SignupEmail>,
) -> error::Result<Json<()>> {
    if data.user.len() < error::MIN_USER_NAME_LEN {
        return Err(error::Error::UserNameTooShort.into());
    }
    if data.user.len() > error::MAX_USER_NAME_LEN {
        return Err(error::Error::UserNameTooLong.into());
    }
    if data.password.len() < error::MIN_USER_PASSWORD_LEN {
        return Err(error::Error::UserPasswordTooShort.into());
    }
    if data.password.len() > error::MAX_USER_PASSWORD_LEN {
        return Err(error::Error::UserPasswordTooLong.into());
    }
    if !data.user.contains('@') {
        return Err(error::Error::InvalidEmail.into());
    }

    let user_exists = state.lock().await.users.contains_key(&data.user);
    if user_exists {
        return Err(error::Error::SignupExistedUser.into());
    }
    let pass_hash = bcrypt::hash(&data.password).map_err(error::Error::from)?;
    let upd = StateUpdate::new(UpdateBody::Signup(SignupInfo {
        username: data.user.clone(),
        email: data.user.clone(),
        auth: SignupAuth::Password(pass_hash),
    }));
    match commit_update(updater, upd).await {
        Ok(()) => {
            info!("New user {} signed up", data.user);
            Ok(Json(()))
        }
        // Lost the race with a concurrent signup
        Err(UpdateFailure::Apply(StateUpdateErr::UserAlreadyExists(_))) => {
            Err(error::Error::SignupExistedUser.into())
        }
        Err(e) => {
            error!("Failed to sign up {}: {e}", data.user);
            Err(error::Error::InternalServerError.into())
        }
    }
}

#[openapi(tag = "auth")]
#[post("/signin/email", data = "<data>")]
pub async fn signin_email(
    state: &RState<Arc<Mutex<State>>>,
    data: Json<api::SigninEmail>,
    cookies: &CookieJar<'_>,
) -> error::Result<Json<()>> {
    let user = state.lock().await.users.get(&data.user).cloned();
    match user {
        Some(UserInfo {
            auth: SignupAuth::Password(pass_hash),
            ..
        }) if bcrypt::verify(&data.password, &pass_hash) => {
            set_session(cookies, &data.user);
            Ok(Json(()))
        }
        _ => Err(error::Error::SigninFailed.into()),
    }
}

#[openapi(tag = "auth")]
#[post("/logout")]
pub async fn logout(cookies: &CookieJar<'_>) -> error::Result<Json<()>> {
    require_auth(cookies, |_| async move {
        clear_session(cookies);
        Ok(Json(()))
    })
    .await
}
