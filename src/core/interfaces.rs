// @file: kline_fetcher/src/core/interfaces.rs
// @description: Seam between callers and a concrete exchange REST client.
// @author: LAS.

use async_trait::async_trait;
use crate::core::errors::KlineError;
use crate::core::models::{Candle, KlineQuery};

//
// TRAIT DEFINITIONS
//

#[async_trait]
pub trait ExchangeRestClient: Send + Sync {
    // #1. Fetch one batch of historical candles
    // Every candle in the batch shares the metadata built from `query`.
    async fn fetch_history(&self, query: &KlineQuery) -> Result<Vec<Candle>, KlineError>;
}
