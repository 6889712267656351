pub mod endpoint;
pub mod fixtures;

pub use endpoint::Endpoint;
pub use fixtures::FixtureSource;

use analysis_core::{AnalysisError, BundleSource, ProviderPayloads, SymbolBundle};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const MAX_ATTEMPTS: u32 = 3;

/// Free tier allowance.
pub const DEFAULT_RATE_LIMIT: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
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
            max_requests: max_requests.max(1),
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

            // Wait for the oldest request to leave the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).duration_since(now) + Duration::from_millis(50),
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for Alpha Vantage slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Alpha Vantage client fetching the five payloads a symbol's metrics are built from.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
    retry_delay: Duration,
}

impl AlphaVantageClient {
    pub fn new(api_key: String, requests_per_minute: usize, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
            base_url: BASE_URL.to_string(),
            retry_delay: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }
            if attempt + 1 == MAX_ATTEMPTS {
                break;
            }

            tracing::warn!(
                "Alpha Vantage 429 rate limited, waiting {}ms before retry {}/{}",
                self.retry_delay.as_millis(),
                attempt + 1,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(self.retry_delay).await;
        }

        Err(AnalysisError::ApiError(format!(
            "Rate limited by Alpha Vantage after {} retries",
            MAX_ATTEMPTS
        )))
    }

    /// Raw JSON body of one endpoint.
    pub async fn fetch_endpoint(&self, symbol: &str, endpoint: Endpoint) -> Result<Value, AnalysisError> {
        tracing::debug!("Fetching {} for {}", endpoint.function(), symbol);
        let response = self
            .send_request(
                self.client
                    .get(&self.base_url)
                    .query(&endpoint.query(symbol, &self.api_key)),
            )
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {} from {}: {}",
                response.status(),
                endpoint.function(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AnalysisError::ApiError(format!("{} body: {}", endpoint.function(), e)))
    }

    /// All five payloads of a symbol, requested concurrently.
    pub async fn fetch_payloads(&self, symbol: &str) -> Result<ProviderPayloads, AnalysisError> {
        let (overview, cash_flow, balance_sheet, income_statement, daily) = tokio::try_join!(
            self.fetch_endpoint(symbol, Endpoint::Overview),
            self.fetch_endpoint(symbol, Endpoint::CashFlow),
            self.fetch_endpoint(symbol, Endpoint::BalanceSheet),
            self.fetch_endpoint(symbol, Endpoint::IncomeStatement),
            self.fetch_endpoint(symbol, Endpoint::DailySeries),
        )?;

        Ok(ProviderPayloads {
            overview,
            cash_flow,
            balance_sheet,
            income_statement,
            daily,
        })
    }
}

#[async_trait]
impl BundleSource for AlphaVantageClient {
    async fn fetch_bundle(&self, symbol: &str) -> Result<SymbolBundle, AnalysisError> {
        let payloads = self.fetch_payloads(symbol).await?;
        Ok(SymbolBundle::from_payloads(symbol, &payloads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn body_for(request: &str) -> String {
        if request.contains("function=OVERVIEW") {
            r#"{"Symbol": "IBM", "MarketCapitalization": "1000000000", "TrailingPE": "22.5"}"#.to_string()
        } else if request.contains("function=CASH_FLOW") {
            r#"{"annualReports": [{"fiscalDateEnding": "2023-12-31", "operatingCashflow": "50000000"}]}"#
                .to_string()
        } else if request.contains("function=TIME_SERIES_DAILY") {
            r#"{"Time Series (Daily)": {"2024-06-28": {"1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5", "5. volume": "100"}}}"#
                .to_string()
        } else {
            "{}".to_string()
        }
    }

    /// Local HTTP server answering the first `rate_limited` requests with 429.
    async fn spawn_server(rate_limited: usize) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    let hit = counter.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = if hit < rate_limited {
                        ("429 Too Many Requests", "{}".to_string())
                    } else {
                        ("200 OK", body_for(&request))
                    };
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}/query", addr), hits)
    }

    fn test_client(base_url: &str) -> AlphaVantageClient {
        AlphaVantageClient::new("demo".to_string(), 100, Duration::from_secs(5))
            .with_base_url(base_url)
            .with_retry_delay(Duration::from_millis(10))
            .with_http_client(Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_burst_within_budget() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let burst = async {
            for _ in 0..3 {
                limiter.acquire().await;
            }
        };
        assert!(tokio::time::timeout(Duration::from_secs(1), burst).await.is_ok());

        // The fourth request has to wait for the window to roll over.
        let blocked = tokio::time::timeout(Duration::from_millis(100), limiter.acquire()).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_fetch_bundle_parses_all_payloads() {
        let (url, hits) = spawn_server(0).await;
        let bundle = test_client(&url).fetch_bundle("IBM").await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 5);
        assert_eq!(bundle.symbol, "IBM");
        assert_eq!(bundle.overview.market_capitalization, Some(1_000_000_000.0));
        assert_eq!(bundle.cash_flow.annual.len(), 1);
        assert_eq!(bundle.daily.len(), 1);
        assert!(bundle.income.annual.is_empty());
    }

    #[tokio::test]
    async fn test_retries_after_429() {
        let (url, hits) = spawn_server(2).await;
        let payloads = test_client(&url).fetch_payloads("IBM").await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 7);
        assert!(payloads.overview.is_object());
    }

    #[tokio::test]
    async fn test_no_retry_delay_after_last_attempt() {
        let (url, hits) = spawn_server(usize::MAX).await;
        let client = test_client(&url).with_retry_delay(Duration::from_millis(400));

        let started = std::time::Instant::now();
        let result = client.fetch_endpoint("IBM", Endpoint::Overview).await;
        assert!(result.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        // Two waits between three attempts, none after the last.
        assert!(started.elapsed() < Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn test_gives_up_after_three_429s() {
        let (url, _) = spawn_server(usize::MAX).await;
        let err = test_client(&url)
            .fetch_endpoint("IBM", Endpoint::Overview)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ApiError("Rate limited by Alpha Vantage after 3 retries".to_string())
        );
    }
}
