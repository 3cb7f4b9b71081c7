//! News and market data sources
//!
//! Both are best-effort: any failure (missing key, timeout, bad payload) is
//! logged and turned into an empty result so suggestion delivery never blocks.

use crate::error::AdvisorError;
use crate::models::{NewsArticle, StockPerformance};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, query: &str, limit: usize) -> Vec<NewsArticle>;
}

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_performance(&self, tickers: &[String], period: &str) -> Vec<StockPerformance>;
}

fn build_http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .timeout(timeout)
        .build()?)
}

async fn get_json(client: &Client, url: &str, query: &[(&str, String)]) -> Result<Value> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| {
            AdvisorError::DataFetch(format!("request to {} failed: {}", url, e.without_url()))
        })?;

    let status = response.status();
    let body = response
        .json::<Value>()
        .await
        .map_err(|e| {
            AdvisorError::DataFetch(format!("invalid JSON from {}: {}", url, e.without_url()))
        })?;

    if !status.is_success() {
        return Err(AdvisorError::DataFetch(format!(
            "{} returned {}: {}",
            url, status, body
        )));
    }

    Ok(body)
}

//
// ================= News =================
//

/// NewsAPI `everything` search
pub struct NewsApiClient {
    client: Client,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_key,
        })
    }

    async fn search(&self, api_key: &str, query: &str, limit: usize) -> Result<Vec<NewsArticle>> {
        let params = [
            ("q", query.to_string()),
            ("language", "en".to_string()),
            ("sortBy", "relevancy".to_string()),
            ("pageSize", limit.to_string()),
            ("apiKey", api_key.to_string()),
        ];

        let body = get_json(&self.client, NEWS_API_URL, &params).await?;
        Ok(parse_articles(&body, limit))
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch_news(&self, query: &str, limit: usize) -> Vec<NewsArticle> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("NEWSAPI_KEY not configured, skipping news");
            return Vec::new();
        };

        match self.search(api_key, query, limit).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("News fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Pull `{title, url}` pairs out of a NewsAPI response.
fn parse_articles(body: &Value, limit: usize) -> Vec<NewsArticle> {
    body.get("articles")
        .and_then(Value::as_array)
        .map(|articles| {
            articles
                .iter()
                .filter_map(|a| {
                    Some(NewsArticle {
                        title: a.get("title")?.as_str()?.to_string(),
                        url: a.get("url")?.as_str()?.to_string(),
                    })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

//
// ================= Market Data =================
//

/// Yahoo Finance chart endpoint, one request per ticker
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
        })
    }

    async fn closes(&self, ticker: &str, period: &str) -> Result<Vec<f64>> {
        let url = format!("{}/{}", YAHOO_CHART_URL, ticker);
        let params = [("range", period.to_string()), ("interval", "1d".to_string())];
        let body = get_json(&self.client, &url, &params).await?;
        Ok(parse_closes(&body))
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch_performance(&self, tickers: &[String], period: &str) -> Vec<StockPerformance> {
        let mut performance = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            match self.closes(ticker, period).await {
                Ok(closes) => match percent_change(&closes) {
                    Some(change_pct) => performance.push(StockPerformance {
                        ticker: ticker.clone(),
                        change_pct,
                    }),
                    None => debug!(ticker = %ticker, "Not enough price points"),
                },
                Err(e) => warn!(ticker = %ticker, "Market data fetch failed: {}", e),
            }
        }

        performance
    }
}

/// Close prices from a chart response, skipping null entries.
fn parse_closes(body: &Value) -> Vec<f64> {
    body.pointer("/chart/result/0/indicators/quote/0/close")
        .and_then(Value::as_array)
        .map(|closes| closes.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

/// Change from first to last close in percent, rounded to two decimals.
fn percent_change(closes: &[f64]) -> Option<f64> {
    let first = *closes.first()?;
    let last = *closes.last()?;

    if closes.len() < 2 || first == 0.0 {
        return None;
    }

    let change = (last - first) / first * 100.0;
    Some((change * 100.0).round() / 100.0)
}
