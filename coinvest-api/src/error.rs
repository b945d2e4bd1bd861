use std::fmt::Display;

use log::*;
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::Response;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::util::add_schema_response;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub const MIN_USER_NAME_LEN: usize = 3;
pub const MAX_USER_NAME_LEN: usize = 320;
pub const MIN_USER_PASSWORD_LEN: usize = 6;
pub const MAX_USER_PASSWORD_LEN: usize = 1024;

pub type Result<T> = std::result::Result<T, ErrorMessage>;

pub trait CoinvestError {
    /// Error subtype, defines concrete error enum: coinvest_api, coinvest_auth etc
    fn subtype() -> &'static str;
    /// Internal error code. Paired with subtype uniquely defines the error
    fn code(&self) -> u16;
    /// Server status code: 400, 401, 500 etc
    fn status(&self) -> u16;
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorMessage {
    /// Internal code of the error. Paired with subtype uniquely defines the error
    pub code: u16,
    /// Subtype
    pub subtype: String,
    /// Server code of the error: 400, 401, 500 etc
    pub status: u16,
    /// Error message
    pub message: String,
}

impl<E: CoinvestError + Display> From<E> for ErrorMessage {
    fn from(err: E) -> ErrorMessage {
        ErrorMessage {
            code: err.code(),
            status: err.status(),
            message: format!("{err}"),
            subtype: E::subtype().to_string(),
        }
    }
}

impl ErrorMessage {
    /// JSON body that is sent to the client
    pub fn body(&self) -> serde_json::Value {
        json!({
            "success": false,
            "id": format!("{}:{}", self.subtype, self.code),
            "message": self.message
        })
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ErrorMessage {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        warn!("[{}:{}]: {}", self.subtype, self.code, self.message);
        let resp = serde_json::to_string(&self.body()).unwrap_or_default();
        Response::build()
            .status(Status::from_code(self.status).unwrap_or(Status::InternalServerError))
            .header(ContentType::JSON)
            .sized_body(resp.len(), std::io::Cursor::new(resp))
            .ok()
    }
}

impl OpenApiResponderInner for ErrorMessage {
    fn responses(
        gen: &mut rocket_okapi::gen::OpenApiGenerator,
    ) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();
        for status in [400, 401, 404, 500] {
            let schema = gen.json_schema::<ErrorMessage>();
            add_schema_response(&mut responses, status, "application/json", schema)?;
        }
        Ok(responses)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to sign up new user. The user already exists.")]
    SignupExistedUser,
    #[error(
        "Failed to signup user. The user name is too short. Need >= {MIN_USER_NAME_LEN} symbols"
    )]
    UserNameTooShort,
    #[error(
        "Failed to signup user. The user name is too long. Need <= {MAX_USER_NAME_LEN} symbols"
    )]
    UserNameTooLong,
    #[error("Failed to signup user. The user password is too short. Need >= {MIN_USER_PASSWORD_LEN} symbols")]
    UserPasswordTooShort,
    #[error("Failed to signup user. The user password is too long. Need <= {MAX_USER_PASSWORD_LEN} symbols")]
    UserPasswordTooLong,
    #[error("Password hash failed: {0}")]
    Pwhash(#[from] pwhash::error::Error),
    #[error("Username of password is invalid")]
    SigninFailed,
    #[error("Invalid e-mail")]
    InvalidEmail,
    #[error("Amount and wallet address are required")]
    MissingWithdrawalFields,
    #[error("Failed to send OTP")]
    OtpDeliveryFailed,
    #[error("Internal server error")]
    InternalServerError,
    #[error("Request body is not valid JSON")]
    MalformedBody,
}

impl CoinvestError for Error {
    fn subtype() -> &'static str {
        "coinvest_api"
    }

    fn code(&self) -> u16 {
        match self {
            Error::SignupExistedUser => 0,
            Error::UserNameTooShort => 1,
            Error::UserNameTooLong => 2,
            Error::UserPasswordTooShort => 3,
            Error::UserPasswordTooLong => 4,
            Error::Pwhash(_) => 5,
            Error::SigninFailed => 6,
            Error::InvalidEmail => 7,
            Error::MissingWithdrawalFields => 8,
            Error::OtpDeliveryFailed => 9,
            Error::InternalServerError => 10,
            Error::MalformedBody => 11,
        }
    }

    fn status(&self) -> u16 {
        match self {
            Error::SignupExistedUser => 400,
            Error::UserNameTooShort => 400,
            Error::UserNameTooLong => 400,
            Error::UserPasswordTooShort => 400,
            Error::UserPasswordTooLong => 400,
            Error::Pwhash(_) => 500,
            Error::SigninFailed => 401,
            Error::InvalidEmail => 400,
            Error::MissingWithdrawalFields => 400,
            Error::OtpDeliveryFailed => 500,
            Error::InternalServerError => 500,
            Error::MalformedBody => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_body() {
        let msg: ErrorMessage = Error::MissingWithdrawalFields.into();
        assert_eq!(msg.status, 400);
        assert_eq!(
            msg.body(),
            json!({
                "success": false,
                "id": "coinvest_api:8",
                "message": "Amount and wallet address are required"
            })
        );
    }

    #[test]
    fn test_internal_error_is_generic() {
        let msg: ErrorMessage = Error::InternalServerError.into();
        assert_eq!(msg.status, 500);
        assert_eq!(msg.message, "Internal server error");
    }
}
