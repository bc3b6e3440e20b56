use std::io;

#[derive(thiserror::Error, Debug)]
pub enum TrainerError {
    #[error("malformed url: {0}")]
    MalformedUrl(String),
    #[error("attack {attack} not applicable: {reason}")]
    AttackNotApplicable {
        attack: &'static str,
        reason: String,
    },
    #[error("no url available, try again later")]
    NoUrlAvailable,
    #[error("no active round")]
    NoActiveRound,
    #[error("progress has not finished loading")]
    NotReady,
    #[error("config error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http error: {0}")]
    Http(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for TrainerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TrainerError::Timeout
        } else if err.is_connect() {
            TrainerError::Network(err.to_string())
        } else if err.is_status() {
            TrainerError::Http(err.to_string())
        } else {
            TrainerError::Network(err.to_string())
        }
    }
}

/// Storage failures. Never fatal to gameplay: callers log these and keep the
/// in-memory progress as the authoritative copy.
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("db error: {0}")]
    Db(String),
    #[error("remote store error: {0}")]
    Remote(String),
    #[error("remote version moved on (expected {expected}, found {found})")]
    Conflict { expected: String, found: String },
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::Db(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}
