use async_trait::async_trait;
use portfolio_core::{
    normalize_ticker, MarketDataProvider, PortfolioError, PriceMap, NIFTY_TICKER, SENSEX_TICKER,
};
use reqwest::Client;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const PRICEMAP_PATH: &str = "/market/quotes/get-pricemap";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sliding-window rate limiter: at most `max_requests` per `window`.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            let oldest = match ts.front() {
                Some(&front) => front,
                None => return,
            };
            let sleep_dur =
                (oldest + self.window).duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for quote service slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// The set of tickers actually requested for a report: the holdings'
/// tickers, uppercased and de-duplicated, plus the two benchmark indices
/// so the comparison series are always available.
pub fn with_benchmarks(tickers: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in tickers {
        let upper = t.to_uppercase();
        if !out.contains(&upper) {
            out.push(upper);
        }
    }
    for index in [NIFTY_TICKER, SENSEX_TICKER] {
        if !out.iter().any(|t| t == index) {
            out.push(index.to_string());
        }
    }
    out
}

/// Re-key a raw provider response so every entry is reachable under both
/// its exact uppercase key and the suffix-stripped key. Exact keys win
/// over aliases when both exist.
pub fn reindex_variants(raw: PriceMap) -> PriceMap {
    let mut out = PriceMap::new();
    let mut aliases: Vec<(String, portfolio_core::PriceEntry)> = Vec::new();

    for (key, entry) in raw {
        let upper = key.to_uppercase();
        let stripped = normalize_ticker(&upper);
        if stripped != upper {
            aliases.push((stripped, entry.clone()));
        }
        out.insert(upper, entry);
    }
    for (key, entry) in aliases {
        out.entry(key).or_insert(entry);
    }
    out
}

/// HTTP client for the market data service. One POST fetches last
/// prices plus daily and monthly OHLC for a whole ticker batch.
#[derive(Clone)]
pub struct MarketDataClient {
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl MarketDataClient {
    pub fn new(base_url: String) -> Self {
        // Default 120 req/min; self-hosted quote services that proxy a
        // free upstream should set QUOTES_RATE_LIMIT lower.
        let rate_limit: usize = std::env::var("QUOTES_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, PortfolioError> {
        let request = builder
            .build()
            .map_err(|e| PortfolioError::ApiError(e.to_string()))?;

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| PortfolioError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| PortfolioError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!(
                "Quote service 429 rate limited, waiting {}s before retry {}/3",
                wait_secs,
                attempt + 1
            );
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(PortfolioError::ApiError(
            "Rate limited by quote service after 3 retries".to_string(),
        ))
    }

    /// Fetch the price map for a ticker batch. The returned map is
    /// re-keyed into suffix variants so core lookups succeed regardless
    /// of the provider's ticker convention.
    pub async fn fetch_price_map(&self, tickers: &[String]) -> Result<PriceMap, PortfolioError> {
        if tickers.is_empty() {
            return Ok(PriceMap::new());
        }

        let url = format!("{}{}", self.base_url, PRICEMAP_PATH);
        let response = self
            .send_request(self.client.post(&url).json(&json!({ "tickers": tickers })))
            .await?;

        if !response.status().is_success() {
            return Err(PortfolioError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let raw: PriceMap = response
            .json()
            .await
            .map_err(|e| PortfolioError::ApiError(e.to_string()))?;

        tracing::debug!("Fetched price map with {} raw keys", raw.len());
        Ok(reindex_variants(raw))
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataClient {
    async fn get_price_map(&self, tickers: &[String]) -> Result<PriceMap, PortfolioError> {
        self.fetch_price_map(tickers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::PriceEntry;

    #[test]
    fn test_with_benchmarks_appends_indices_once() {
        let tickers = vec!["tcs".to_string(), "TCS".to_string(), "INFY".to_string()];
        let out = with_benchmarks(&tickers);
        assert_eq!(out, vec!["TCS", "INFY", "^NSEI", "^BSESN"]);
    }

    #[test]
    fn test_with_benchmarks_keeps_existing_index() {
        let tickers = vec!["^NSEI".to_string()];
        let out = with_benchmarks(&tickers);
        assert_eq!(out, vec!["^NSEI", "^BSESN"]);
    }

    #[test]
    fn test_reindex_adds_stripped_alias() {
        let mut raw = PriceMap::new();
        raw.insert(
            "TCS.NS".to_string(),
            PriceEntry {
                last_price: Some(3300.0),
                ..Default::default()
            },
        );

        let map = reindex_variants(raw);
        assert_eq!(map.get("TCS.NS").and_then(|e| e.last_price), Some(3300.0));
        assert_eq!(map.get("TCS").and_then(|e| e.last_price), Some(3300.0));
    }

    #[test]
    fn test_reindex_exact_key_wins_over_alias() {
        let mut raw = PriceMap::new();
        raw.insert(
            "TCS".to_string(),
            PriceEntry {
                last_price: Some(1.0),
                ..Default::default()
            },
        );
        raw.insert(
            "TCS.NS".to_string(),
            PriceEntry {
                last_price: Some(2.0),
                ..Default::default()
            },
        );

        let map = reindex_variants(raw);
        assert_eq!(map.get("TCS").and_then(|e| e.last_price), Some(1.0));
        assert_eq!(map.get("TCS.NS").and_then(|e| e.last_price), Some(2.0));
    }

    #[test]
    fn test_reindex_uppercases_keys() {
        let mut raw = PriceMap::new();
        raw.insert("tcs.ns".to_string(), PriceEntry::default());

        let map = reindex_variants(raw);
        assert!(map.contains_key("TCS.NS"));
        assert!(map.contains_key("TCS"));
        assert!(!map.contains_key("tcs.ns"));
    }
}
