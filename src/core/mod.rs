// @file: kline_fetcher\src\core\mod.rs
// @description: Exports domain types, errors and client traits.
// @author: LAS.

pub mod errors;
pub mod interfaces;
pub mod models;
