use crate::climate::ZoneError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid zone: {0}")]
    InvalidZone(#[from] ZoneError),

    #[error("Failed to parse or serialize JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LiveKit token error: {0}")]
    Token(#[from] livekit_api::access_token::AccessTokenError),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("The connection was closed unexpectedly")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
