use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("invalid server definition: {0}")]
    InvalidServer(String),
    #[error("invalid port in server definition: {0}")]
    InvalidPort(String),
}
