// src/core/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DidelError>;

/// Everything that can go wrong talking to the portal.
///
/// Expected, recoverable outcomes (missing page, repeat fetch, failed
/// substring check) are reported as boolean results by the callers; only
/// rule violations and broken I/O become errors.
#[derive(Debug, Error)]
pub enum DidelError {
    /// A sub-resource was accessed before its parent was fetched.
    #[error("{0} is not populated")]
    NotPopulated(&'static str),

    /// An authenticated operation ran on a session whose login failed.
    #[error("login required, check your credentials (didel login:init)")]
    LoginRequired,

    /// Non-ok response on an operation that needs a hard failure signal.
    #[error("server error {status} ({reason}) on {url}")]
    Server {
        status: u16,
        reason: String,
        url: String,
    },

    /// The page fetched fine but did not look like it should.
    #[error("unexpected page layout: {0}")]
    Scrape(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("bad config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
