// @file: kline_fetcher/src/connectors/binance/binance_rest.rs
// @description: HTTP client for fetching historical klines from Binance, blocking and async.
// @author: LAS.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use tokio::task::JoinHandle;
use crate::connectors::binance::decoder::decode_response;
use crate::core::errors::KlineError;
use crate::core::interfaces::ExchangeRestClient;
use crate::core::models::{Candle, Interval, KlineQuery, MarketType};
use crate::utils::config::AppConfig;


pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

pub type CandleResult = Result<Vec<Candle>, KlineError>;


//
// CLIENT
//

/// Klines client bound to one market endpoint.
///
/// Clones share the same connection pools, so one instance can be handed to
/// any number of concurrent callers.
#[derive(Clone)]
pub struct BinanceRestClient {
    endpoint: Arc<str>,
    timeout: Duration,
    client: Client,
    // Created on first blocking call; building it inside a runtime is not allowed.
    blocking: Arc<OnceLock<reqwest::blocking::Client>>,
}

impl Default for BinanceRestClient {
    fn default() -> Self {
        BinanceRestClient::new(MarketType::Spot)
    }
}

impl BinanceRestClient {
    //
    // INITIALIZATION
    //

    pub fn new(market: MarketType) -> Self {
        BinanceRestClient::with_endpoint(market.public_host(), market, DEFAULT_TIMEOUT)
    }

    /// Spot klines served from `base_url` instead of the public host.
    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        BinanceRestClient::with_endpoint(base_url.as_ref(), MarketType::Spot, DEFAULT_TIMEOUT)
    }

    pub fn with_endpoint(base_url: &str, market: MarketType, timeout: Duration) -> Self {
        let endpoint: String = format!("{}{}", base_url.trim_end_matches('/'), market.klines_path());

        BinanceRestClient {
            endpoint: Arc::from(endpoint),
            timeout,
            client: Client::new(),
            blocking: Arc::new(OnceLock::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let base_url: &str = if config.base_url.is_empty() {
            config.market_type.public_host()
        } else {
            &config.base_url
        };

        BinanceRestClient::with_endpoint(base_url, config.market_type, config.request_timeout())
    }

    /// Process-wide spot client, created on first use.
    pub fn global() -> &'static BinanceRestClient {
        static GLOBAL: OnceLock<BinanceRestClient> = OnceLock::new();
        GLOBAL.get_or_init(BinanceRestClient::default)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }


    //
    // ASYNC INTERFACE
    //

    pub async fn get_candles(&self, query: &KlineQuery) -> CandleResult {
        fetch_async(&self.client, &self.endpoint, self.timeout, query).await
    }

    /// Starts the request on the current Tokio runtime right away.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
    pub fn get_candles_async(&self, query: KlineQuery) -> PendingCandles {
        let client: Client = self.client.clone();
        let endpoint: Arc<str> = Arc::clone(&self.endpoint);
        let timeout: Duration = self.timeout;

        let handle: JoinHandle<CandleResult> = tokio::spawn(async move {
            fetch_async(&client, &endpoint, timeout, &query).await
        });

        PendingCandles { handle }
    }

    pub async fn get_latest(&self, symbol: &str, interval: Interval) -> CandleResult {
        self.get_candles(&KlineQuery::new(symbol, interval)).await
    }

    pub async fn get_latest_n(&self, symbol: &str, interval: Interval, limit: i32) -> CandleResult {
        self.get_candles(&KlineQuery::new(symbol, interval).with_limit(limit)).await
    }

    pub async fn get_range(
        &self,
        symbol: &str,
        interval: Interval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<i32>
    ) -> CandleResult {
        let query: KlineQuery = KlineQuery {
            limit,
            ..KlineQuery::new(symbol, interval).with_range(start_time, end_time)
        };
        self.get_candles(&query).await
    }


    //
    // BLOCKING INTERFACE
    //

    /// Blocks the calling thread until the response is decoded.
    ///
    /// Must not be called from within an async context.
    pub fn get_candles_blocking(&self, query: &KlineQuery) -> CandleResult {
        // #1. Metadata is fixed before the request goes out
        let metadata = query.shared_metadata()?;
        let url: String = query.to_url(&self.endpoint);
        log::debug!("GET {} (blocking)", url);

        // #2. Execute Request
        let client: &reqwest::blocking::Client = self.blocking.get_or_init(reqwest::blocking::Client::new);
        let response = client.get(&url).timeout(self.timeout).send()?;

        let status: u16 = response.status().as_u16();
        let body: String = response.text()?;

        // #3. Decode
        decode_response(status, &body, &metadata)
    }

    pub fn get_latest_blocking(&self, symbol: &str, interval: Interval) -> CandleResult {
        self.get_candles_blocking(&KlineQuery::new(symbol, interval))
    }

    pub fn get_latest_n_blocking(&self, symbol: &str, interval: Interval, limit: i32) -> CandleResult {
        self.get_candles_blocking(&KlineQuery::new(symbol, interval).with_limit(limit))
    }

    pub fn get_range_blocking(
        &self,
        symbol: &str,
        interval: Interval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<i32>
    ) -> CandleResult {
        let query: KlineQuery = KlineQuery {
            limit,
            ..KlineQuery::new(symbol, interval).with_range(start_time, end_time)
        };
        self.get_candles_blocking(&query)
    }
}

#[async_trait]
impl ExchangeRestClient for BinanceRestClient {
    async fn fetch_history(&self, query: &KlineQuery) -> Result<Vec<Candle>, KlineError> {
        self.get_candles(query).await
    }
}


//
// PENDING FETCH
//

/// In-flight fetch started by [`BinanceRestClient::get_candles_async`].
///
/// Resolves once, to the candles or to the error. Dropping it does not stop
/// the request; `abort` does, and the pending value then resolves to
/// `KlineError::Task`.
#[must_use = "the fetch runs regardless, but its result is lost unless awaited"]
pub struct PendingCandles {
    handle: JoinHandle<CandleResult>,
}

impl PendingCandles {
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for PendingCandles {
    type Output = CandleResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.map_err(KlineError::from).and_then(|result| result))
    }
}


//
// INTERNAL HELPERS
//

async fn fetch_async(client: &Client, endpoint: &str, timeout: Duration, query: &KlineQuery) -> CandleResult {
    // #1. Metadata is fixed before the request goes out
    let metadata = query.shared_metadata()?;
    let url: String = query.to_url(endpoint);
    log::debug!("GET {}", url);

    // #2. Execute Request
    let response = client.get(&url).timeout(timeout).send().await?;

    let status: u16 = response.status().as_u16();
    let body: String = response.text().await?;

    // #3. Decode
    decode_response(status, &body, &metadata)
}
