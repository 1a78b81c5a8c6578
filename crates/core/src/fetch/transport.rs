use anyhow::Context;
use reqwest::Url;

/// Failure below the HTTP response level: DNS, connection reset, TLS, timeout.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// `None` when the status line could not be read.
    pub status: Option<u16>,
    pub body: Vec<u8>,
}

/// Send one GET request, receive status and body or a transport error.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

/// Production transport. Uses the client's default timeouts.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build portfolio http client")?;
        Ok(Self { http })
    }

    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let res = self.http.get(url.clone()).send().await?;
        let status = res.status().as_u16();
        // A body cut off mid-read is a transport failure, not a decode failure.
        let body = res.bytes().await?.to_vec();

        Ok(TransportResponse {
            status: Some(status),
            body,
        })
    }
}
