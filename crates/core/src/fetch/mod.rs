pub mod error;
pub mod remote;
pub mod transport;

pub use error::FetchError;
pub use remote::{RemoteStockFetcher, PORTFOLIO_ENDPOINT};
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};

use crate::domain::stock::StockRecord;

/// Fetch seam consumed by the presentation layer.
///
/// Classified failures travel as [`FetchError`] inside the `anyhow::Error`;
/// anything else is an unexpected failure.
#[async_trait::async_trait]
pub trait StockFetcher: Send + Sync {
    async fn fetch_stocks(&self) -> anyhow::Result<()>;

    /// Most recently fetched stocks, `None` until the first successful fetch.
    fn stocks(&self) -> Option<Vec<StockRecord>>;
}
