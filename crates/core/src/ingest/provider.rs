use crate::domain::forecast::PriceSeries;
use std::fmt;

/// Historical span over which closing prices are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookback {
    OneMonth,
    #[default]
    ThreeMonths,
    SixMonths,
}

impl Lookback {
    pub fn as_range_param(&self) -> &'static str {
        match self {
            Lookback::OneMonth => "1mo",
            Lookback::ThreeMonths => "3mo",
            Lookback::SixMonths => "6mo",
        }
    }

    /// Reads `MARKET_LOOKBACK` ("1mo" / "3mo" / "6mo"); anything else
    /// falls back to the default.
    pub fn from_env() -> Self {
        match std::env::var("MARKET_LOOKBACK").ok().as_deref() {
            Some("1mo") => Lookback::OneMonth,
            Some("3mo") => Lookback::ThreeMonths,
            Some("6mo") => Lookback::SixMonths,
            _ => Lookback::default(),
        }
    }
}

/// Typed failure of a price fetch, so callers can tell "no such symbol"
/// from "upstream broke" even though the API surfaces all of them the
/// same way.
#[derive(Debug)]
pub enum MarketDataError {
    UnknownSymbol { ticker: String },
    EmptySeries { ticker: String },
    Upstream { detail: String },
}

impl fmt::Display for MarketDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketDataError::UnknownSymbol { ticker } => {
                write!(f, "unknown ticker: {ticker}")
            }
            MarketDataError::EmptySeries { ticker } => {
                write!(f, "no price data for ticker: {ticker}")
            }
            MarketDataError::Upstream { detail } => {
                write!(f, "market data provider failed: {detail}")
            }
        }
    }
}

impl std::error::Error for MarketDataError {}

impl MarketDataError {
    pub fn upstream(detail: impl fmt::Display) -> Self {
        MarketDataError::Upstream {
            detail: detail.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Fetches the closing-price series for `ticker`, ordered
    /// oldest-to-newest. Never returns a partially-valid series: any
    /// failure, unknown symbol, or empty result is an error.
    async fn fetch_closing_prices(
        &self,
        ticker: &str,
        lookback: Lookback,
    ) -> Result<PriceSeries, MarketDataError>;
}
