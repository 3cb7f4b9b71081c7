//! Runtime configuration
//!
//! Values come from the process environment, optionally seeded from a `.env` file.

use crate::error::AdvisorError;
use crate::Result;
use std::env;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MARKET_PERIOD: &str = "6mo";

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub news_api_key: Option<String>,
    pub api_port: u16,
    /// Benchmarks shown in the market snapshot; empty disables the snapshot.
    pub market_tickers: Vec<String>,
    pub market_period: String,
    pub fetch_timeout: Duration,
}

impl AdvisorConfig {
    /// Load `.env` (if present) and read the advisor settings.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

        let gemini_model = env::var("GEMINI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let news_api_key = env::var("NEWSAPI_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let api_port = match env::var("PORT").or_else(|_| env::var("API_PORT")) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AdvisorError::Config(format!("invalid port: {}", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        let market_tickers = env::var("MARKET_TICKERS")
            .map(|raw| parse_ticker_list(&raw))
            .unwrap_or_default();

        let market_period = env::var("MARKET_PERIOD")
            .unwrap_or_else(|_| DEFAULT_MARKET_PERIOD.to_string());

        let fetch_timeout_secs = match env::var("DATA_FETCH_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                AdvisorError::Config(format!("invalid DATA_FETCH_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model,
            news_api_key,
            api_port,
            market_tickers,
            market_period,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        })
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_MODEL.to_string(),
            news_api_key: None,
            api_port: DEFAULT_PORT,
            market_tickers: Vec::new(),
            market_period: DEFAULT_MARKET_PERIOD.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

/// Split a comma separated ticker list, dropping blanks.
fn parse_ticker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
