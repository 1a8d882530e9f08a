use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("no reachable workers in the routing pool")]
    NoAvailableTarget,

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("routing failure: {0}")]
    Routing(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::net::AddrParseError> for MeshError {
    fn from(err: std::net::AddrParseError) -> Self {
        MeshError::InvalidRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;
