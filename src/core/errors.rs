// @file: kline_fetcher/src/core/errors.rs
// @description: Error taxonomy and the decoder for Binance's JSON error envelope.
// @author: LAS.

use serde::Deserialize;
use thiserror::Error;


//
// ERROR TYPES
//

#[derive(Debug, Error)]
pub enum KlineError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid symbol: symbol may not be empty")]
    EmptySymbol,

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl KlineError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, KlineError::Transport(e) if e.is_timeout())
    }
}

/// Application-level error reported by the exchange in a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {http_status} (code {exchange_code}): {message}")]
pub struct RequestError {
    pub http_status: u16,
    pub exchange_code: i64,
    pub message: String,
}


//
// ERROR ENVELOPE DECODER
//

// https://binance-docs.github.io/apidocs/spot/en/#general-api-information
#[derive(Deserialize)]
struct BinanceErrorBody {
    code: i64,
    msg: String,
}

impl RequestError {
    /// Decodes the `{"code": .., "msg": ..}` body of a failed response.
    ///
    /// # Panics
    ///
    /// Panics if `http_status` is a success status; only failed responses
    /// carry an error envelope.
    pub fn from_response(http_status: u16, body: &str) -> Result<RequestError, KlineError> {
        assert!(
            !(200..300).contains(&http_status),
            "RequestError built from a success status ({})",
            http_status
        );

        let envelope: BinanceErrorBody = serde_json::from_str(body).map_err(|e| {
            KlineError::MalformedResponse(format!("Error body (HTTP {}): {}", http_status, e))
        })?;

        Ok(RequestError {
            http_status,
            exchange_code: envelope.code,
            message: envelope.msg,
        })
    }
}
