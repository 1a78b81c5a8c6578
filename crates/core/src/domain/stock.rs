use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Decoded response envelope of the portfolio endpoint.
///
/// Decoding enforces that every ticker is non-empty and unique; a violation
/// fails the decode like any other schema mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePortfolio")]
pub struct Portfolio {
    pub stocks: Vec<StockRecord>,
}

/// One traded position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub ticker: String,
    pub name: String,
    /// ISO currency code used when formatting the price.
    pub currency: String,
    /// Price in minor units. Always USD cents regardless of `currency`.
    pub current_price_cents: i64,
    /// Shares held; `None` for rows where a quantity does not apply (index tickers).
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Unix epoch seconds (UTC) of the last price calculation.
    pub current_price_timestamp: i64,
}

impl StockRecord {
    pub fn id(&self) -> &str {
        &self.ticker
    }

    pub fn price_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.current_price_timestamp, 0)
    }

    /// Splits the magnitude of the price into whole units and the cents
    /// remainder. The sign is reported by [`StockRecord::is_negative_price`].
    pub fn price_units(&self) -> (u64, u64) {
        let cents = self.current_price_cents.unsigned_abs();
        (cents / 100, cents % 100)
    }

    pub fn is_negative_price(&self) -> bool {
        self.current_price_cents < 0
    }
}

#[derive(Debug, Deserialize)]
struct WirePortfolio {
    stocks: Vec<StockRecord>,
}

impl TryFrom<WirePortfolio> for Portfolio {
    type Error = String;

    fn try_from(wire: WirePortfolio) -> Result<Self, Self::Error> {
        let mut seen = BTreeSet::<&str>::new();
        for stock in &wire.stocks {
            if stock.ticker.is_empty() {
                return Err("ticker must be non-empty".to_string());
            }
            if !seen.insert(stock.ticker.as_str()) {
                return Err(format!("duplicate ticker: {}", stock.ticker));
            }
        }

        Ok(Self {
            stocks: wire.stocks,
        })
    }
}
