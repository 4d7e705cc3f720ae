use thiserror::Error;

pub type Result<T> = std::result::Result<T, LemmyError>;

#[derive(Debug, Error)]
pub enum LemmyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Login succeeded but no token was issued (email verification or approval pending?)")]
    MissingToken,
}

impl From<reqwest::Error> for LemmyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LemmyError::Parse(err.to_string())
        } else {
            LemmyError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LemmyError {
    fn from(err: serde_json::Error) -> Self {
        LemmyError::Parse(err.to_string())
    }
}
