//! Error types for the extraction engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid pattern in vocabulary ({name}): {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("vocabulary file error: {0}")]
    Vocabulary(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("month must be between 1 and 12, got {0:?}")]
    InvalidMonth(String),
}

pub type Result<T> = std::result::Result<T, Error>;
