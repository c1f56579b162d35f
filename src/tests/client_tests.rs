// @file: kline_fetcher/src/tests/client_tests.rs
// @description: End-to-end fetch paths (async, spawned, blocking) against a mock Binance server.
// @author: LAS.

#[cfg(test)]
mod client_tests {
    use crate::connectors::binance::{BinanceRestClient, PendingCandles};
    use crate::core::errors::KlineError;
    use crate::core::interfaces::ExchangeRestClient;
    use crate::core::models::{Candle, Interval, KlineQuery, MarketType};
    use futures_util::future::join_all;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    //
    // FIXTURES
    //

    const KLINES_PATH: &str = "/api/v3/klines";

    const TWO_KLINES: &str = r#"[
        [1620000000000,"100.0","110.0","90.0","105.0","50.0",1620003599999,"5000.0",42,"0","0","0"],
        [1620003600000,"105.0","108.0","101.0","107.5","30.0",1620007199999,"3200.0",17,"0","0","0"]
    ]"#;

    async fn mount_klines(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(KLINES_PATH))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn btc_query() -> KlineQuery {
        KlineQuery::new("BTCUSDT", Interval::Hour1).with_limit(2)
    }

    //
    // ASYNC
    //

    #[tokio::test]
    async fn test_get_candles_sends_query_and_decodes() {
        let server: MockServer = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(KLINES_PATH))
            .and(query_param("symbol", "BTCUSDT"))
            .and(query_param("interval", "1h"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TWO_KLINES))
            .expect(1)
            .mount(&server)
            .await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let candles: Vec<Candle> = client.get_candles(&btc_query()).await.unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time, 1620000000000);
        assert_eq!(candles[1].close, 107.5);
        assert_eq!(candles[1].number_of_trades, 17);
        assert!(Arc::ptr_eq(candles[0].metadata(), candles[1].metadata()));
        assert_eq!(candles[1].symbol(), "BTCUSDT");
    }

    #[tokio::test]
    async fn test_absent_parameters_are_not_sent() {
        let server: MockServer = MockServer::start().await;
        mount_klines(&server, ResponseTemplate::new(200).set_body_string("[]")).await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let candles: Vec<Candle> = client.get_latest("ETHUSDT", Interval::Minute5).await.unwrap();
        assert!(candles.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), Some("symbol=ETHUSDT&interval=5m"));
    }

    #[tokio::test]
    async fn test_get_range_forwards_all_parameters() {
        let server: MockServer = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(KLINES_PATH))
            .and(query_param("startTime", "1620000000000"))
            .and(query_param("endTime", "1620007199999"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TWO_KLINES))
            .expect(1)
            .mount(&server)
            .await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let candles: Vec<Candle> = client
            .get_range("BTCUSDT", Interval::Hour1, Some(1620000000000), Some(1620007199999), Some(10))
            .await
            .unwrap();

        assert_eq!(candles.len(), 2);
    }

    #[tokio::test]
    async fn test_exchange_error_is_surfaced() {
        let server: MockServer = MockServer::start().await;
        mount_klines(
            &server,
            ResponseTemplate::new(400).set_body_string(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
        ).await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());

        match client.get_latest_n("NOPE", Interval::Hour1, 10).await {
            Err(KlineError::Request(e)) => {
                assert_eq!(e.http_status, 400);
                assert_eq!(e.exchange_code, -1121);
                assert_eq!(e.message, "Invalid symbol.");
            }
            other => panic!("Expected RequestError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_symbol_never_hits_the_network() {
        let server: MockServer = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(0)
            .mount(&server)
            .await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let result = client.get_latest("", Interval::Day1).await;

        assert!(matches!(result, Err(KlineError::EmptySymbol)));
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_failure() {
        let server: MockServer = MockServer::start().await;
        mount_klines(
            &server,
            ResponseTemplate::new(200).set_body_string("[]").set_delay(Duration::from_secs(2)),
        ).await;

        let client: BinanceRestClient =
            BinanceRestClient::with_endpoint(&server.uri(), MarketType::Spot, Duration::from_millis(200));

        let err: KlineError = client.get_candles(&btc_query()).await.unwrap_err();
        assert!(err.is_timeout(), "Expected timeout, got {:?}", err);
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_transport_failure() {
        let client: BinanceRestClient = BinanceRestClient::with_base_url("http://127.0.0.1:1");
        let err: KlineError = client.get_candles(&btc_query()).await.unwrap_err();

        assert!(matches!(err, KlineError::Transport(_)));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let server: MockServer = MockServer::start().await;
        mount_klines(&server, ResponseTemplate::new(200).set_body_string(TWO_KLINES)).await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let queries: Vec<KlineQuery> = ["BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT"]
            .iter()
            .map(|s| KlineQuery::new(*s, Interval::Hour1))
            .collect();

        let results = join_all(queries.iter().map(|q| client.get_candles(q))).await;

        let batches: Vec<Vec<Candle>> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[2][0].symbol(), "BNBUSDT");
        assert!(!Arc::ptr_eq(batches[0][0].metadata(), batches[1][0].metadata()));
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let server: MockServer = MockServer::start().await;
        mount_klines(&server, ResponseTemplate::new(200).set_body_string(TWO_KLINES)).await;

        let source: Box<dyn ExchangeRestClient> = Box::new(BinanceRestClient::with_base_url(server.uri()));
        let candles: Vec<Candle> = source.fetch_history(&btc_query()).await.unwrap();

        assert_eq!(candles.len(), 2);
    }

    //
    // SPAWNED (EAGER) FETCH
    //

    #[tokio::test]
    async fn test_spawned_fetch_starts_before_await() {
        let server: MockServer = MockServer::start().await;
        mount_klines(&server, ResponseTemplate::new(200).set_body_string(TWO_KLINES)).await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let pending: PendingCandles = client.get_candles_async(btc_query());

        // #1. Request reaches the server while nobody awaits the handle
        let mut seen: usize = 0;
        for _ in 0..100 {
            seen = server.received_requests().await.map(|r| r.len()).unwrap_or(0);
            if seen > 0 { break; }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(seen, 1);

        for _ in 0..100 {
            if pending.is_finished() { break; }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(pending.is_finished());

        // #2. Result is still delivered through the handle
        let candles: Vec<Candle> = pending.await.unwrap();
        assert_eq!(candles.len(), 2);
    }

    #[tokio::test]
    async fn test_spawned_fetch_delivers_decode_errors() {
        let server: MockServer = MockServer::start().await;
        mount_klines(&server, ResponseTemplate::new(200).set_body_string(r#"[[1, "2", "3"]]"#)).await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let result = client.get_candles_async(btc_query()).await;

        assert!(matches!(result, Err(KlineError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_aborted_fetch_resolves_to_task_error() {
        let server: MockServer = MockServer::start().await;
        mount_klines(
            &server,
            ResponseTemplate::new(200).set_body_string(TWO_KLINES).set_delay(Duration::from_secs(5)),
        ).await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let pending: PendingCandles = client.get_candles_async(btc_query());
        pending.abort();

        match pending.await {
            Err(KlineError::Task(e)) => assert!(e.is_cancelled()),
            other => panic!("Expected cancelled task, got {:?}", other),
        }

        // #1. Client remains usable after the abort
        let server_ok: MockServer = MockServer::start().await;
        mount_klines(&server_ok, ResponseTemplate::new(200).set_body_string("[]")).await;
        let other: BinanceRestClient = BinanceRestClient::with_base_url(server_ok.uri());
        assert!(other.get_candles(&btc_query()).await.unwrap().is_empty());
    }

    //
    // BLOCKING
    //

    #[tokio::test]
    async fn test_blocking_matches_async() {
        let server: MockServer = MockServer::start().await;
        mount_klines(&server, ResponseTemplate::new(200).set_body_string(TWO_KLINES)).await;

        let async_client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let from_async: Vec<Candle> = async_client.get_candles(&btc_query()).await.unwrap();

        // The blocking client has to live and drop outside the runtime.
        let blocking_client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let from_blocking: Vec<Candle> = tokio::task::spawn_blocking(move || {
            blocking_client.get_candles_blocking(&btc_query())
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(from_async, from_blocking);
        assert!(Arc::ptr_eq(from_blocking[0].metadata(), from_blocking[1].metadata()));
    }

    #[tokio::test]
    async fn test_blocking_surfaces_exchange_error() {
        let server: MockServer = MockServer::start().await;
        mount_klines(
            &server,
            ResponseTemplate::new(418).set_body_string(r#"{"code":-1003,"msg":"Way too many requests; IP banned."}"#),
        ).await;

        let client: BinanceRestClient = BinanceRestClient::with_base_url(server.uri());
        let result = tokio::task::spawn_blocking(move || {
            client.get_latest_n_blocking("BTCUSDT", Interval::Minute1, 5)
        })
        .await
        .unwrap();

        match result {
            Err(KlineError::Request(e)) => {
                assert_eq!(e.http_status, 418);
                assert_eq!(e.exchange_code, -1003);
            }
            other => panic!("Expected RequestError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blocking_timeout_is_a_transport_failure() {
        let server: MockServer = MockServer::start().await;
        mount_klines(
            &server,
            ResponseTemplate::new(200).set_body_string("[]").set_delay(Duration::from_secs(2)),
        ).await;

        let client: BinanceRestClient =
            BinanceRestClient::with_endpoint(&server.uri(), MarketType::Spot, Duration::from_millis(200));

        let err: KlineError = tokio::task::spawn_blocking(move || client.get_candles_blocking(&btc_query()))
            .await
            .unwrap()
            .unwrap_err();

        assert!(err.is_timeout(), "Expected timeout, got {:?}", err);
    }

    #[tokio::test]
    async fn test_blocking_connection_refused_is_a_transport_failure() {
        let client: BinanceRestClient = BinanceRestClient::with_base_url("http://127.0.0.1:1");

        let err: KlineError = tokio::task::spawn_blocking(move || client.get_candles_blocking(&btc_query()))
            .await
            .unwrap()
            .unwrap_err();

        assert!(matches!(err, KlineError::Transport(_)));
        assert!(!err.is_timeout());
    }

    //
    // CONSTRUCTION
    //

    #[test]
    fn test_endpoints() {
        assert_eq!(
            BinanceRestClient::with_base_url("http://localhost:8080/").endpoint(),
            "http://localhost:8080/api/v3/klines"
        );
        assert_eq!(
            BinanceRestClient::new(MarketType::LinearFuture).endpoint(),
            "https://fapi.binance.com/fapi/v1/klines"
        );
        assert_eq!(BinanceRestClient::default().timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_global_client_is_shared() {
        let a: &'static BinanceRestClient = BinanceRestClient::global();
        let b: &'static BinanceRestClient = BinanceRestClient::global();

        assert!(std::ptr::eq(a, b));
        assert_eq!(a.endpoint(), "https://api.binance.com/api/v3/klines");
    }
}
