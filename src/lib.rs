// @file: kline_fetcher\src\lib.rs
// @description: Historical Binance kline retrieval with shared batch metadata.
// @author: LAS.


pub mod core;
pub mod connectors;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::connectors::binance::{BinanceRestClient, PendingCandles};
pub use crate::core::errors::{KlineError, RequestError};
pub use crate::core::models::{Candle, Interval, KlineQuery, MarketType, SharedMetadata};
