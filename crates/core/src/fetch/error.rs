use crate::fetch::transport::TransportError;
use thiserror::Error;

/// Classified failure of a single portfolio fetch. The set is closed; every
/// variant is terminal for the attempt that produced it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint string could not be parsed into a request target.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// A response arrived with a status outside 200..=299.
    #[error("portfolio endpoint returned HTTP {0}")]
    Http(u16),

    /// The request did not complete at the transport layer.
    #[error("portfolio request failed: {0}")]
    Network(#[source] TransportError),

    /// The body was not valid JSON for the portfolio schema.
    #[error("failed to decode portfolio: {0}")]
    Decoding(#[source] serde_json::Error),

    /// The body decoded but carried zero stocks.
    #[error("portfolio contains no stocks")]
    EmptyResult,
}

impl FetchError {
    /// Status code carried by [`FetchError::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(status) => Some(*status),
            _ => None,
        }
    }
}
