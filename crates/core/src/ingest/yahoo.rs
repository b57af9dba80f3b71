use crate::config::Settings;
use crate::domain::forecast::{PricePoint, PriceSeries};
use crate::ingest::provider::{Lookback, MarketDataError, MarketDataProvider};
use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// A hung upstream becomes a timeout error rather than a stalled request.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client for the Yahoo Finance chart endpoint. Every forecast request
/// triggers a fresh fetch: no retry, no caching.
#[derive(Debug, Clone)]
pub struct YahooFinanceProvider {
    http: reqwest::Client,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .market_data_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("MARKET_DATA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            ticker
        )
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn fetch_closing_prices(
        &self,
        ticker: &str,
        lookback: Lookback,
    ) -> Result<PriceSeries, MarketDataError> {
        let res = self
            .http
            .get(self.url(ticker))
            .query(&[("range", lookback.as_range_param()), ("interval", "1d")])
            .send()
            .await
            .map_err(MarketDataError::upstream)?;

        let status = res.status();
        let text = res.text().await.map_err(MarketDataError::upstream)?;

        // Unknown symbols come back as an error object in the chart body,
        // usually alongside a 404 status. Decode the body first so that
        // case surfaces as UnknownSymbol rather than a bare HTTP error.
        let body = match serde_json::from_str::<ChartResponse>(&text) {
            Ok(body) => body,
            Err(err) if status.is_success() => {
                return Err(MarketDataError::upstream(format!(
                    "unexpected chart payload: {err}"
                )));
            }
            Err(_) => {
                return Err(MarketDataError::Upstream {
                    detail: format!("HTTP {status}"),
                });
            }
        };

        series_from_chart(ticker, body)
    }
}

fn series_from_chart(ticker: &str, body: ChartResponse) -> Result<PriceSeries, MarketDataError> {
    if let Some(err) = body.chart.error {
        tracing::debug!(ticker, code = %err.code, description = %err.description, "chart error from provider");
        return Err(MarketDataError::UnknownSymbol {
            ticker: ticker.to_string(),
        });
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(MarketDataError::EmptySeries {
            ticker: ticker.to_string(),
        });
    };

    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Err(MarketDataError::EmptySeries {
            ticker: ticker.to_string(),
        });
    };

    // Null closes (halts, partial sessions) are skipped, mirroring the
    // dropna the original applied to the downloaded frame.
    let series: PriceSeries = result
        .timestamp
        .iter()
        .zip(quote.close.iter())
        .filter_map(|(&ts, close)| {
            let close = (*close)?;
            let timestamp = DateTime::from_timestamp(ts, 0)?;
            Some(PricePoint { timestamp, close })
        })
        .collect();

    if series.is_empty() {
        return Err(MarketDataError::EmptySeries {
            ticker: ticker.to_string(),
        });
    }

    Ok(series)
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
