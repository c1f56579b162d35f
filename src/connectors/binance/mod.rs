// @file: kline_fetcher/src/connectors/binance/mod.rs
// @description: Binance klines REST connector.
// @author: LAS.

pub mod binance_rest;
pub mod decoder;
pub mod url_builder;

pub use binance_rest::{BinanceRestClient, CandleResult, PendingCandles, DEFAULT_TIMEOUT};
