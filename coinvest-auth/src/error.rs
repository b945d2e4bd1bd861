use coinvest_api::error::CoinvestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Action requires authentification")]
    AuthRequired,
    #[error("User not found")]
    NoUserFound,
}

impl CoinvestError for Error {
    fn subtype() -> &'static str {
        "coinvest_auth"
    }

    fn code(&self) -> u16 {
        match self {
            Error::AuthRequired => 0,
            Error::NoUserFound => 1,
        }
    }

    fn status(&self) -> u16 {
        match self {
            Error::AuthRequired => 401,
            Error::NoUserFound => 404,
        }
    }
}
