// @file: kline_fetcher/src/connectors/binance/url_builder.rs
// @description: Builds klines query URLs from optional filter parameters.
// @author: LAS.

use url::form_urlencoded::byte_serialize;
use crate::core::models::{Interval, KlineQuery};


//
// BUILDER
//

/// Query URL for the klines endpoint.
///
/// Parameters are emitted in a fixed order (symbol, interval, startTime,
/// endTime, limit) and absent ones are left out. Ranges are not validated.
#[derive(Debug, Clone, Default)]
pub struct KlinesUrl<'a> {
    endpoint: &'a str,
    symbol: Option<&'a str>,
    interval: Option<Interval>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: Option<i32>,
}

impl<'a> KlinesUrl<'a> {
    pub fn new(endpoint: &'a str) -> Self {
        KlinesUrl { endpoint, ..Default::default() }
    }

    pub fn symbol(mut self, symbol: &'a str) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn start_time(mut self, start_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn end_time(mut self, end_time: Option<i64>) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn limit(mut self, limit: Option<i32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn build(&self) -> String {
        // #1. Collect present parameters in wire order
        let params: [(&str, Option<String>); 5] = [
            ("symbol", self.symbol.map(str::to_string)),
            ("interval", self.interval.map(|i| i.token().to_string())),
            ("startTime", self.start_time.map(|v| v.to_string())),
            ("endTime", self.end_time.map(|v| v.to_string())),
            ("limit", self.limit.map(|v| v.to_string())),
        ];

        // #2. Append with '?' for the first and '&' for the rest
        let mut url: String = String::with_capacity(self.endpoint.len() + 96);
        url.push_str(self.endpoint);

        let mut count: usize = 0;
        for (name, value) in params {
            let Some(value) = value else { continue };

            url.push(if count == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.extend(byte_serialize(value.as_bytes()));
            count += 1;
        }

        url
    }
}

impl KlineQuery {
    pub fn to_url(&self, endpoint: &str) -> String {
        KlinesUrl::new(endpoint)
            .symbol(&self.symbol)
            .interval(self.interval)
            .start_time(self.start_time)
            .end_time(self.end_time)
            .limit(self.limit)
            .build()
    }
}
