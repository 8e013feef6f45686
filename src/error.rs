use thiserror::Error;

#[derive(Error, Debug)]
pub enum BiPoError {
    #[error("Event source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("Event carries no valid reconstruction")]
    NoValidFit,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to parse event record: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BiPoError>;
