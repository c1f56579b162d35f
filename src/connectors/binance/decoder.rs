// @file: kline_fetcher/src/connectors/binance/decoder.rs
// @description: Maps raw klines responses (or error envelopes) into candles.
// @author: LAS.

use std::sync::Arc;
use serde_json::Value;
use crate::core::errors::{KlineError, RequestError};
use crate::core::models::{Candle, SharedMetadata};


//
// POSITIONAL LAYOUT
//
// [0] open time, [1] open, [2] high, [3] low, [4] close, [5] volume,
// [6] close time, [7] quote volume, [8] trade count, [9..11] taker volumes / unused.
// Positions 7 and 9..11 are ignored.

const OPEN_TIME: usize = 0;
const OPEN: usize = 1;
const HIGH: usize = 2;
const LOW: usize = 3;
const CLOSE: usize = 4;
const VOLUME: usize = 5;
const CLOSE_TIME: usize = 6;
const TRADE_COUNT: usize = 8;

const MIN_KLINE_FIELDS: usize = TRADE_COUNT + 1;


//
// PUBLIC INTERFACE
//

/// Decodes one HTTP exchange. Shared by the async and blocking fetch paths.
pub fn decode_response(
    status: u16,
    body: &str,
    metadata: &Arc<SharedMetadata>
) -> Result<Vec<Candle>, KlineError> {
    // #1. Error envelope
    if !(200..300).contains(&status) {
        let error: RequestError = RequestError::from_response(status, body)?;
        log::warn!("Binance rejected klines request for {}: {}", metadata.symbol(), error);
        return Err(error.into());
    }

    // #2. Success body
    let json: Value = serde_json::from_str(body)
        .map_err(|e| KlineError::MalformedResponse(format!("JSON Parse Error: {}", e)))?;

    let candles: Vec<Candle> = decode_kline_array(&json, metadata)?;
    log::debug!("Decoded {} candles for {} {}", candles.len(), metadata.symbol(), metadata.interval());

    Ok(candles)
}

/// All-or-nothing: the first malformed element fails the whole batch.
pub fn decode_kline_array(json: &Value, metadata: &Arc<SharedMetadata>) -> Result<Vec<Candle>, KlineError> {
    let raw_list: &Vec<Value> = json.as_array()
        .ok_or_else(|| malformed("Expected an array of klines"))?;

    raw_list.iter()
        .enumerate()
        .map(|(idx, item)| decode_kline(item, metadata)
            .map_err(|e| match e {
                KlineError::MalformedResponse(reason) => malformed(format!("Kline #{}: {}", idx, reason)),
                other => other,
            }))
        .collect()
}


//
// INTERNAL HELPERS
//

fn decode_kline(item: &Value, metadata: &Arc<SharedMetadata>) -> Result<Candle, KlineError> {
    let arr: &Vec<Value> = item.as_array()
        .ok_or_else(|| malformed("Expected a kline array"))?;

    if arr.len() < MIN_KLINE_FIELDS {
        return Err(malformed(format!(
            "Expected at least {} fields, got {}", MIN_KLINE_FIELDS, arr.len()
        )));
    }

    let open_time: i64 = field_i64(arr, OPEN_TIME)?;
    let close_time: i64 = field_i64(arr, CLOSE_TIME)?;

    if close_time < open_time {
        return Err(malformed(format!(
            "Close time {} precedes open time {}", close_time, open_time
        )));
    }

    let trade_count: i64 = field_i64(arr, TRADE_COUNT)?;
    let number_of_trades: i32 = i32::try_from(trade_count)
        .map_err(|_| malformed(format!("Trade count {} out of range", trade_count)))?;

    Ok(Candle {
        metadata: Arc::clone(metadata),
        open_time,
        close_time,
        open: field_f64(arr, OPEN)?,
        close: field_f64(arr, CLOSE)?,
        low: field_f64(arr, LOW)?,
        high: field_f64(arr, HIGH)?,
        volume: field_f64(arr, VOLUME)?,
        number_of_trades,
    })
}

// Prices and volumes arrive as decimal strings; plain numbers are accepted too.
// NaN and infinities are never valid quotes.
fn field_f64(arr: &[Value], idx: usize) -> Result<f64, KlineError> {
    let value: Option<f64> = match &arr[idx] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite());
    value.ok_or_else(|| malformed(format!("Field {} is not numeric: {}", idx, arr[idx])))
}

fn field_i64(arr: &[Value], idx: usize) -> Result<i64, KlineError> {
    let value: Option<i64> = match &arr[idx] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    };
    value.ok_or_else(|| malformed(format!("Field {} is not an integer: {}", idx, arr[idx])))
}

fn malformed(reason: impl Into<String>) -> KlineError {
    KlineError::MalformedResponse(reason.into())
}
