// @file: kline_fetcher/src/tests/mod.rs
// @description: Crate test suites.
// @author: LAS.

mod client_tests;
