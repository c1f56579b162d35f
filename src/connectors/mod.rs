// @file: kline_fetcher/src/connectors/mod.rs
// @description: Exchange connectors. Binance klines is the only one.
// @author: LAS.

pub mod binance;
