use crate::domain::stock::{Portfolio, StockRecord};
use crate::fetch::error::FetchError;
use crate::fetch::transport::HttpTransport;
use crate::fetch::StockFetcher;
use reqwest::Url;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const PORTFOLIO_ENDPOINT: &str =
    "https://storage.googleapis.com/cash-homework/cash-stocks-api/portfolio.json";

// Reported when a response arrives but its status cannot be read.
const UNREADABLE_STATUS: u16 = 500;

/// Fetches the portfolio from a fixed endpoint and keeps the last good result.
///
/// Not meant for overlapping `fetch` calls on one instance: concurrent calls
/// race to overwrite the held stocks.
#[derive(Debug)]
pub struct RemoteStockFetcher<T> {
    transport: T,
    endpoint: String,
    last_stocks: RwLock<Option<Vec<StockRecord>>>,
}

impl<T: HttpTransport> RemoteStockFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self::with_endpoint(transport, PORTFOLIO_ENDPOINT)
    }

    pub fn with_endpoint(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            last_stocks: RwLock::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn last_stocks(&self) -> Option<Vec<StockRecord>> {
        self.read_stocks().clone()
    }

    /// Runs one fetch. Held stocks are replaced only when every step succeeds.
    pub async fn fetch(&self) -> Result<(), FetchError> {
        let url = Url::parse(&self.endpoint).map_err(|err| {
            tracing::debug!(endpoint = %self.endpoint, error = %err, "endpoint is not a valid URL");
            FetchError::InvalidUrl(self.endpoint.clone())
        })?;

        tracing::debug!(%url, "requesting portfolio");
        let res = self
            .transport
            .get(&url)
            .await
            .map_err(FetchError::Network)?;

        let status = res.status.unwrap_or(UNREADABLE_STATUS);
        if !(200..=299).contains(&status) {
            tracing::warn!(%url, status, "portfolio endpoint returned non-success status");
            return Err(FetchError::Http(status));
        }

        let portfolio =
            serde_json::from_slice::<Portfolio>(&res.body).map_err(FetchError::Decoding)?;
        if portfolio.stocks.is_empty() {
            return Err(FetchError::EmptyResult);
        }

        tracing::info!(stocks = portfolio.stocks.len(), "portfolio fetched");
        *self.write_stocks() = Some(portfolio.stocks);
        Ok(())
    }

    fn read_stocks(&self) -> RwLockReadGuard<'_, Option<Vec<StockRecord>>> {
        self.last_stocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_stocks(&self) -> RwLockWriteGuard<'_, Option<Vec<StockRecord>>> {
        self.last_stocks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport> StockFetcher for RemoteStockFetcher<T> {
    async fn fetch_stocks(&self) -> anyhow::Result<()> {
        self.fetch().await?;
        Ok(())
    }

    fn stocks(&self) -> Option<Vec<StockRecord>> {
        self.last_stocks()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::transport::stub::{StubReply, StubTransport};
    use serde_json::json;

    pub(crate) fn valid_portfolio_body() -> Vec<u8> {
        json!({
            "stocks": [
                {
                    "ticker": "AAPL",
                    "name": "AppleInc.",
                    "currency": "USD",
                    "current_price_cents": 17562,
                    "quantity": null,
                    "current_price_timestamp": 1681845832
                },
                {
                    "ticker": "RUNWAY",
                    "name": "Rent The Runway",
                    "currency": "USD",
                    "current_price_cents": 24819,
                    "quantity": 20,
                    "current_price_timestamp": 1681845832
                }
            ]
        })
        .to_string()
        .into_bytes()
    }

    const MALFORMED_BODY: &str = r#"{
        "stocks": [
            {
                ticker":"RUNWAY",
                "name":"Rent The Runway",
                "currency":"USD",
                "current_price_cents":24819,
                "quantity":20,
                "current_price_timestamp":1681845832
            }
        ]
    }malformedmalformedmalformed"#;

    fn fetcher(replies: Vec<StubReply>) -> RemoteStockFetcher<StubTransport> {
        RemoteStockFetcher::new(StubTransport::new(replies))
    }

    fn tickers(stocks: &[StockRecord]) -> Vec<&str> {
        stocks.iter().map(|s| s.ticker.as_str()).collect()
    }

    #[tokio::test]
    async fn delivers_http_error_on_non_2xx_even_with_valid_body() {
        for status in [199, 300, 400, 404, 500, 503] {
            let sut = fetcher(vec![StubReply::ok(status, valid_portfolio_body())]);
            let err = sut.fetch().await.unwrap_err();
            assert!(
                matches!(err, FetchError::Http(code) if code == status),
                "status {status}: unexpected {err:?}"
            );
            assert_eq!(sut.last_stocks(), None);
        }
    }

    #[tokio::test]
    async fn accepts_every_2xx_status() {
        for status in [200, 201, 204, 299] {
            let sut = fetcher(vec![StubReply::ok(status, valid_portfolio_body())]);
            sut.fetch().await.unwrap();
            assert_eq!(sut.last_stocks().map(|s| s.len()), Some(2));
        }
    }

    #[tokio::test]
    async fn unreadable_status_reports_sentinel_500() {
        let sut = fetcher(vec![StubReply::unreadable_status(valid_portfolio_body())]);
        let err = sut.fetch().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn delivers_decoding_error_on_malformed_json() {
        let sut = fetcher(vec![StubReply::ok(200, MALFORMED_BODY)]);
        let err = sut.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Decoding(_)), "unexpected {err:?}");
    }

    #[tokio::test]
    async fn delivers_decoding_error_on_missing_field() {
        let body = json!({
            "stocks": [{ "ticker": "AAPL", "name": "AppleInc.", "currency": "USD" }]
        });
        let sut = fetcher(vec![StubReply::ok(200, body.to_string())]);
        let err = sut.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Decoding(_)), "unexpected {err:?}");
    }

    #[tokio::test]
    async fn delivers_decoding_error_on_duplicate_ticker() {
        let body = json!({
            "stocks": [
                { "ticker": "AAPL", "name": "A", "currency": "USD",
                  "current_price_cents": 1, "current_price_timestamp": 1 },
                { "ticker": "AAPL", "name": "B", "currency": "USD",
                  "current_price_cents": 2, "current_price_timestamp": 2 }
            ]
        });
        let sut = fetcher(vec![StubReply::ok(200, body.to_string())]);
        let err = sut.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Decoding(_)), "unexpected {err:?}");
    }

    #[tokio::test]
    async fn delivers_empty_result_on_empty_stock_list() {
        let sut = fetcher(vec![StubReply::ok(200, r#"{"stocks": []}"#)]);
        let err = sut.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyResult), "unexpected {err:?}");
        assert_eq!(sut.last_stocks(), None);
    }

    #[tokio::test]
    async fn delivers_network_error_on_transport_failure() {
        let sut = fetcher(vec![StubReply::fail("connection reset by peer")]);
        let err = sut.fetch().await.unwrap_err();
        let FetchError::Network(cause) = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(cause.to_string(), "connection reset by peer");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn delivers_invalid_url_without_touching_transport() {
        let transport = StubTransport::new(vec![StubReply::ok(200, valid_portfolio_body())]);
        let sut = RemoteStockFetcher::with_endpoint(transport, "not a url");
        let err = sut.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(ref e) if e == "not a url"));
        assert!(sut.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn delivers_stocks_in_wire_order() {
        let sut = fetcher(vec![StubReply::ok(200, valid_portfolio_body())]);
        sut.fetch().await.unwrap();

        let stocks = sut.last_stocks().unwrap();
        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks[0].ticker, "AAPL");
        assert_eq!(stocks[1].ticker, "RUNWAY");
        assert_eq!(stocks[0].quantity, None);
        assert_eq!(stocks[1].quantity, Some(20));
    }

    #[tokio::test]
    async fn requests_the_fixed_endpoint() {
        let sut = fetcher(vec![StubReply::ok(200, valid_portfolio_body())]);
        sut.fetch().await.unwrap();
        let requests = sut.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].as_str(), PORTFOLIO_ENDPOINT);
    }

    #[tokio::test]
    async fn repeated_fetch_of_same_data_is_idempotent() {
        let sut = fetcher(vec![
            StubReply::ok(200, valid_portfolio_body()),
            StubReply::ok(200, valid_portfolio_body()),
        ]);
        sut.fetch().await.unwrap();
        let first = sut.last_stocks();
        sut.fetch().await.unwrap();
        assert_eq!(sut.last_stocks(), first);
    }

    #[tokio::test]
    async fn failure_keeps_previous_stocks() {
        let sut = fetcher(vec![
            StubReply::ok(200, valid_portfolio_body()),
            StubReply::ok(500, valid_portfolio_body()),
            StubReply::ok(200, MALFORMED_BODY),
            StubReply::ok(200, r#"{"stocks": []}"#),
            StubReply::fail("timed out"),
        ]);
        sut.fetch().await.unwrap();
        let before = sut.last_stocks().unwrap();

        for _ in 0..4 {
            assert!(sut.fetch().await.is_err());
            assert_eq!(sut.last_stocks().as_deref(), Some(before.as_slice()));
        }
        assert_eq!(tickers(&before), ["AAPL", "RUNWAY"]);
    }

    #[tokio::test]
    async fn success_replaces_previous_stocks_wholesale() {
        let single = json!({
            "stocks": [{ "ticker": "TSLA", "name": "Tesla", "currency": "USD",
                         "current_price_cents": 1, "current_price_timestamp": 1 }]
        });
        let sut = fetcher(vec![
            StubReply::ok(200, valid_portfolio_body()),
            StubReply::ok(200, single.to_string()),
        ]);
        sut.fetch().await.unwrap();
        sut.fetch().await.unwrap();
        assert_eq!(tickers(&sut.last_stocks().unwrap()), ["TSLA"]);
    }

    #[tokio::test]
    async fn trait_surfaces_fetch_error_through_anyhow() {
        let sut = fetcher(vec![StubReply::ok(404, "")]);
        let err = sut.fetch_stocks().await.unwrap_err();
        assert_eq!(err.downcast_ref::<FetchError>().and_then(FetchError::status), Some(404));
        assert_eq!(StockFetcher::stocks(&sut), None);
    }
}
