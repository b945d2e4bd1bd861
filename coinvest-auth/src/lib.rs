use std::{future::Future, sync::Arc};

use coinvest_api::error as c_error;
use log::*;
use rocket::{
    http::{Cookie, CookieJar},
    State,
};
use tokio::sync::Mutex;

pub mod error;

use error::Error;

pub const AUTH_COOKIE: &str = "user_id";

pub trait HasUserInfo<I> {
    fn get_user_info(&self, user_id: &str) -> Option<I>;
}

/// Start a session for the given user
pub fn set_session(cookies: &CookieJar<'_>, user_id: &str) {
    cookies.add_private(Cookie::new(AUTH_COOKIE, user_id.to_owned()));
}

/// Drop the session cookie
pub fn clear_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(AUTH_COOKIE);
}

/// Helper for implementing endpoints that require authentication
pub async fn require_auth<F, Fut, R>(cookies: &CookieJar<'_>, future: F) -> c_error::Result<R>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = c_error::Result<R>>,
{
    if let Some(cookie) = cookies.get_private(AUTH_COOKIE) {
        future(cookie.value().to_owned()).await
    } else {
        Err(Error::AuthRequired.into())
    }
}

/// More specific helper than 'require_auth' as it also fetches user info.
///
/// The state lock is released before `future` is polled, so the body is free
/// to wait for the update worker.
pub async fn require_auth_user<F, S, I, Fut, R>(
    cookies: &CookieJar<'_>,
    state: &State<Arc<Mutex<S>>>,
    future: F,
) -> c_error::Result<R>
where
    S: Send + HasUserInfo<I>,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = c_error::Result<R>>,
{
    require_auth(cookies, |user_id| async move {
        let user = state.lock().await.get_user_info(&user_id);
        if let Some(user) = user {
            future(user).await
        } else {
            debug!("Session refers to unknown user {user_id}");
            Err(Error::NoUserFound.into())
        }
    })
    .await
}
