use thiserror::Error;

/// Failure talking to the lamp.
///
/// Covers connection failures and timeouts, rejected commands, and replies
/// that cannot be decoded. The message is meant for humans.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LampError {
    #[error("{0}")]
    Communication(String),
}

impl LampError {
    pub(crate) fn connection() -> Self {
        LampError::Communication("Could not connect to lamp.".to_string())
    }
}

pub type Result<T> = std::result::Result<T, LampError>;
