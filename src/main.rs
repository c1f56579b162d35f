// @file: kline_fetcher/src/main.rs
// @description: Interactive demo: prompts for a query and prints the fetched candles.
// @author: LAS.

use std::io::{self, BufRead, Write};
use kline_fetcher::utils::config::AppConfig;
use kline_fetcher::{BinanceRestClient, Candle, Interval, KlineError, KlineQuery};
use log::{error, info};

fn main() {
    // 1. Environment & Config
    dotenv::dotenv().ok();

    let config: AppConfig = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize Logger, RUST_LOG overrides the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level)).init();

    println!("==========================================");
    println!("Build your request");
    println!("==========================================");

    // 3. Collect Query
    let query: KlineQuery = match read_query(&config) {
        Ok(q) => q,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    println!("==========================================");
    println!("Sending request");
    println!("==========================================");

    // 4. Execute (blocking, outside any runtime)
    let client: BinanceRestClient = BinanceRestClient::from_config(&config);
    info!("Fetching {} {} ({}) from {}", query.symbol, query.interval, config.market_type, client.endpoint());

    let result: Result<Vec<Candle>, KlineError> = client.get_candles_blocking(&query);

    println!("==========================================");
    println!("Result");
    println!("==========================================");

    match result {
        Ok(candles) => candles.iter().for_each(|c| println!("{}", c)),
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    }
}

fn read_query(config: &AppConfig) -> Result<KlineQuery, KlineError> {
    let symbol: String = prompt(&format!("Enter the desired symbol [{}]: ", config.default_symbol))
        .unwrap_or_else(|| config.default_symbol.clone());

    let tokens: Vec<&str> = Interval::ALL.iter().map(Interval::token).collect();
    let interval: Interval = match prompt(&format!("Enter the desired interval ({}) [{}]: ", tokens.join(", "), config.default_interval)) {
        Some(token) => token.parse()?,
        None => config.default_interval.parse()?,
    };

    let limit: i32 = prompt(&format!("Enter the amount of candles needed [{}]: ", config.default_limit))
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.default_limit);

    Ok(KlineQuery::new(symbol, interval).with_limit(limit))
}

// Returns None on empty input or EOF.
fn prompt(message: &str) -> Option<String> {
    print!("{}", message);
    io::stdout().flush().ok()?;

    let mut line: String = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;

    let trimmed: &str = line.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
