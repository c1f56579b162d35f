// @file: kline_fetcher/src/core/models.rs
// @description: Candle data model, shared batch metadata, intervals and query parameters.
// @author: LAS.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use crate::core::errors::KlineError;


//
// INTERVALS
//

/// Candle granularity accepted by the klines endpoint.
///
/// Every variant maps to exactly one wire token and back. Minute is `1m`,
/// month is `1M`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interval {
    #[serde(rename = "1s")] Second1,
    #[serde(rename = "1m")] Minute1,
    #[serde(rename = "3m")] Minute3,
    #[serde(rename = "5m")] Minute5,
    #[serde(rename = "15m")] Minute15,
    #[serde(rename = "30m")] Minute30,
    #[serde(rename = "1h")] Hour1,
    #[serde(rename = "2h")] Hour2,
    #[serde(rename = "4h")] Hour4,
    #[serde(rename = "6h")] Hour6,
    #[serde(rename = "8h")] Hour8,
    #[serde(rename = "12h")] Hour12,
    #[serde(rename = "1d")] Day1,
    #[serde(rename = "3d")] Day3,
    #[serde(rename = "1w")] Week1,
    #[serde(rename = "1M")] Month1,
}

impl Interval {
    pub const ALL: [Interval; 16] = [
        Interval::Second1,
        Interval::Minute1,
        Interval::Minute3,
        Interval::Minute5,
        Interval::Minute15,
        Interval::Minute30,
        Interval::Hour1,
        Interval::Hour2,
        Interval::Hour4,
        Interval::Hour6,
        Interval::Hour8,
        Interval::Hour12,
        Interval::Day1,
        Interval::Day3,
        Interval::Week1,
        Interval::Month1,
    ];

    /// Wire token sent as the `interval` query parameter.
    pub fn token(&self) -> &'static str {
        match self {
            Interval::Second1 => "1s",
            Interval::Minute1 => "1m",
            Interval::Minute3 => "3m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Hour2 => "2h",
            Interval::Hour4 => "4h",
            Interval::Hour6 => "6h",
            Interval::Hour8 => "8h",
            Interval::Hour12 => "12h",
            Interval::Day1 => "1d",
            Interval::Day3 => "3d",
            Interval::Week1 => "1w",
            Interval::Month1 => "1M",
        }
    }

    /// Exact, case-sensitive lookup of a wire token.
    pub fn from_token(token: &str) -> Result<Interval, KlineError> {
        Interval::ALL
            .iter()
            .copied()
            .find(|interval| interval.token() == token)
            .ok_or_else(|| KlineError::InvalidInterval(token.to_string()))
    }
}

impl FromStr for Interval {
    type Err = KlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::from_token(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.token())
    }
}


//
// MARKET TYPES
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketType {
    #[default]
    Spot,
    LinearFuture, // USDT-M
    InverseFuture, // COIN-M
}

impl MarketType {
    pub fn public_host(&self) -> &'static str {
        match self {
            MarketType::Spot => "https://api.binance.com",
            MarketType::LinearFuture => "https://fapi.binance.com",
            MarketType::InverseFuture => "https://dapi.binance.com",
        }
    }

    pub fn klines_path(&self) -> &'static str {
        match self {
            MarketType::Spot => "/api/v3/klines",
            MarketType::LinearFuture => "/fapi/v1/klines",
            MarketType::InverseFuture => "/dapi/v1/klines",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}


//
// CANDLES
//

/// Fields common to every candle of one response, stored once per batch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct SharedMetadata {
    symbol: String,
    interval: Interval,
}

impl SharedMetadata {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Result<Self, KlineError> {
        let symbol: String = symbol.into();
        if symbol.is_empty() {
            return Err(KlineError::EmptySymbol);
        }
        Ok(SharedMetadata { symbol, interval })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }
}

/// One OHLCV bucket.
///
/// Built only by the response decoder. All candles of a batch hold clones of
/// the same `Arc<SharedMetadata>`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Candle {
    pub metadata: Arc<SharedMetadata>,
    pub open_time: i64,
    pub close_time: i64,
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
    pub volume: f64,
    pub number_of_trades: i32,
}

impl Candle {
    pub fn metadata(&self) -> &Arc<SharedMetadata> {
        &self.metadata
    }

    pub fn symbol(&self) -> &str {
        self.metadata.symbol()
    }

    pub fn interval(&self) -> Interval {
        self.metadata.interval()
    }
}

impl fmt::Display for Candle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} [{} -> {}] O:{} H:{} L:{} C:{} V:{} trades:{}",
            self.symbol(),
            self.interval(),
            self.open_time,
            self.close_time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.number_of_trades
        )
    }
}


//
// QUERIES
//

/// Parameters of one klines request. Time bounds are epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KlineQuery {
    pub symbol: String,
    pub interval: Interval,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub limit: Option<i32>,
}

impl KlineQuery {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        KlineQuery {
            symbol: symbol.into(),
            interval,
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_end_time(mut self, end_time: i64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_range(self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        KlineQuery { start_time, end_time, ..self }
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Metadata instance the decoded batch will share.
    pub fn shared_metadata(&self) -> Result<Arc<SharedMetadata>, KlineError> {
        Ok(Arc::new(SharedMetadata::new(self.symbol.clone(), self.interval)?))
    }
}
