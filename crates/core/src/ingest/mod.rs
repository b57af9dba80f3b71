pub mod provider;
pub mod yahoo;

pub use provider::{Lookback, MarketDataError, MarketDataProvider};
