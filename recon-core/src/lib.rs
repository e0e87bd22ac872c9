pub mod selection;
pub mod session;
pub mod sink;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing session data: {0}")]
    MissingSessionData(String),
    #[error("Malformed session data: {0}")]
    MalformedSessionData(String),
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
