// @file: kline_fetcher/src/utils/mod.rs
// @description: Configuration loading.
// @author: LAS.

pub mod config;
