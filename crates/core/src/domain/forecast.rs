use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One daily closing price. Series are ordered oldest-to-newest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

pub type PriceSeries = Vec<PricePoint>;

const DEFAULT_DAMPING_FACTOR: f64 = 0.10;
const DEFAULT_CONFIDENCE: f64 = 0.87;

/// Tuning constants for the naive forecast. `confianca` is a placeholder
/// reported as-is, not a statistical confidence interval.
#[derive(Debug, Clone, Copy)]
pub struct ForecastParams {
    pub damping_factor: f64,
    pub confianca: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            damping_factor: DEFAULT_DAMPING_FACTOR,
            confianca: DEFAULT_CONFIDENCE,
        }
    }
}

impl ForecastParams {
    pub fn from_env() -> Self {
        let damping_factor = std::env::var("FORECAST_DAMPING")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_DAMPING_FACTOR);

        let confianca = std::env::var("FORECAST_CONFIDENCE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(DEFAULT_CONFIDENCE);

        Self {
            damping_factor,
            confianca,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub ticker: String,
    pub preco_atual: f64,
    pub previsao: f64,
    pub confianca: f64,
    pub variacao: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Empty series: there is nothing to extrapolate from.
    NoData,
    /// The provider handed over a non-positive or non-finite price.
    InvalidPrice { price: f64 },
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastError::NoData => write!(f, "price series is empty"),
            ForecastError::InvalidPrice { price } => {
                write!(f, "price series contains invalid price {price}")
            }
        }
    }
}

impl std::error::Error for ForecastError {}

/// Single-point linear extrapolation of the closing-price series.
///
/// The raw first-to-last trend is attenuated by `damping_factor` before
/// being projected onto the current price. Deterministic for a fixed
/// series and params; a single-point series yields a flat forecast.
pub fn forecast(
    ticker: &str,
    series: &[PricePoint],
    params: &ForecastParams,
) -> Result<ForecastResult, ForecastError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(ForecastError::NoData);
    };

    for point in series {
        if !point.close.is_finite() || point.close <= 0.0 {
            return Err(ForecastError::InvalidPrice { price: point.close });
        }
    }

    let preco_atual = last.close;
    let trend = (last.close - first.close) / first.close;
    let previsao = preco_atual * (1.0 + trend * params.damping_factor);

    Ok(ForecastResult {
        ticker: ticker.to_string(),
        preco_atual,
        previsao,
        confianca: params.confianca,
        variacao: trend * 100.0,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series_of(closes: &[f64]) -> PriceSeries {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                close,
            })
            .collect()
    }

    #[test]
    fn extrapolates_damped_trend() {
        let series = series_of(&[100.0, 110.0, 121.0]);
        let out = forecast("PETR4.SA", &series, &ForecastParams::default()).unwrap();

        assert_eq!(out.ticker, "PETR4.SA");
        assert!((out.preco_atual - 121.0).abs() < 1e-12);
        assert!((out.variacao - 21.0).abs() < 1e-9);
        // 121 * (1 + 0.21 * 0.1)
        assert!((out.previsao - 123.541).abs() < 1e-9);
        assert!((out.confianca - 0.87).abs() < 1e-12);
    }

    #[test]
    fn is_deterministic_for_fixed_inputs() {
        let series = series_of(&[10.0, 12.5, 11.0, 13.75]);
        let params = ForecastParams::default();
        let a = forecast("VALE3.SA", &series, &params).unwrap();
        let b = forecast("VALE3.SA", &series, &params).unwrap();
        assert_eq!(a.previsao, b.previsao);
        assert_eq!(a.variacao, b.variacao);
        assert_eq!(a.preco_atual, b.preco_atual);
    }

    #[test]
    fn empty_series_is_no_data() {
        let err = forecast("X", &[], &ForecastParams::default()).unwrap_err();
        assert_eq!(err, ForecastError::NoData);
    }

    #[test]
    fn single_point_series_is_flat() {
        let series = series_of(&[50.0]);
        let out = forecast("X", &series, &ForecastParams::default()).unwrap();
        assert_eq!(out.preco_atual, 50.0);
        assert_eq!(out.previsao, 50.0);
        assert_eq!(out.variacao, 0.0);
    }

    #[test]
    fn zero_base_price_is_rejected() {
        let series = series_of(&[0.0, 10.0]);
        let err = forecast("X", &series, &ForecastParams::default()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidPrice { .. }));
    }

    #[test]
    fn negative_price_is_rejected() {
        let series = series_of(&[100.0, -3.0, 110.0]);
        let err = forecast("X", &series, &ForecastParams::default()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidPrice { price } if price == -3.0));
    }

    #[test]
    fn damping_factor_is_applied() {
        let series = series_of(&[100.0, 150.0]);
        let params = ForecastParams {
            damping_factor: 0.15,
            confianca: 0.88,
        };
        let out = forecast("X", &series, &params).unwrap();
        // 150 * (1 + 0.5 * 0.15)
        assert!((out.previsao - 161.25).abs() < 1e-9);
        assert!((out.confianca - 0.88).abs() < 1e-12);
    }
}
