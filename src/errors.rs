use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")] Config(String),

    #[error("Wallet error: {0}")] Wallet(String),

    #[error("RPC error: {0}")] Rpc(String),

    #[error("Token error: {0}")] Token(String),

    #[error("Route error: {0}")] Route(String),

    #[error("Parse error: {0}")] Parse(String),

    #[error("Transaction failed: {reason}")] TransactionFailed {
        reason: String,
    },

    #[error("HTTP error: {0}")] Http(String),

    #[error("Unsupported chain: {0}")] UnsupportedChain(u64),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

impl Error {
    /// Fatal errors abort startup; everything else degrades and is logged.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
