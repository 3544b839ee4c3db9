use async_trait::async_trait;
use reqwest::Client;
use scoring_core::{AnalysisError, CompanyProfile, FinancialDataSource, RawMetrics};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Mapping from canonical metric key to quote-summary (module, field).
/// The first ten feed the scoring engine; the rest are captured for API
/// consumers and ignored by scoring.
const FIELD_MAP: &[(&str, &str, &str)] = &[
    ("pe_ratio", "summaryDetail", "trailingPE"),
    ("pb_ratio", "defaultKeyStatistics", "priceToBook"),
    ("roe", "financialData", "returnOnEquity"),
    ("debt_to_equity", "financialData", "debtToEquity"),
    ("current_ratio", "financialData", "currentRatio"),
    ("profit_margin", "financialData", "profitMargins"),
    ("dividend_yield", "summaryDetail", "dividendYield"),
    ("revenue_growth", "financialData", "revenueGrowth"),
    ("eps", "defaultKeyStatistics", "trailingEps"),
    ("beta", "summaryDetail", "beta"),
    ("forward_pe", "summaryDetail", "forwardPE"),
    ("peg_ratio", "defaultKeyStatistics", "pegRatio"),
    ("market_cap", "summaryDetail", "marketCap"),
    ("roa", "financialData", "returnOnAssets"),
    ("operating_margin", "financialData", "operatingMargins"),
    ("earnings_growth", "financialData", "earningsGrowth"),
];

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
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
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

            // Wait until the oldest request falls out of the window
            let wait_until = match ts.front().and_then(|f| f.checked_add(self.window)) {
                Some(t) => t,
                None => return,
            };
            let sleep_dur = wait_until.duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for quote API slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

#[derive(Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<serde_json::Value>>,
    #[allow(dead_code)]
    error: Option<serde_json::Value>,
}

/// Quote-summary API client for Yahoo-style endpoints.
///
/// No API key is required; the endpoint rate-limits aggressively, so
/// requests go through a sliding-window limiter and 429 responses retry
/// with exponential backoff.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl YahooClient {
    pub fn new() -> Self {
        // Public endpoint tolerance is roughly one request per second
        // sustained. Override with YAHOO_RATE_LIMIT for mirrors.
        let rate_limit: usize = std::env::var("YAHOO_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let base_url =
            std::env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; equityscope/0.1)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a request with rate limiting and bounded 429 retry.
    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AnalysisError> {
        let request = builder
            .build()
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        for attempt in 0..3u32 {
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

            let wait_secs = 2u64 << attempt;
            tracing::warn!(
                "Quote API 429 rate limited, waiting {}s before retry {}/3",
                wait_secs,
                attempt + 1
            );
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(AnalysisError::ApiError(
            "Rate limited by quote API after 3 retries".to_string(),
        ))
    }

    /// Fetch one quote-summary result object for the requested modules.
    async fn quote_summary(
        &self,
        symbol: &str,
        modules: &str,
    ) -> Result<serde_json::Value, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);

        let response = self
            .send_request(self.client.get(&url).query(&[("modules", modules)]))
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(AnalysisError::DataUnavailable(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let envelope: QuoteSummaryEnvelope = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        envelope
            .quote_summary
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .ok_or_else(|| AnalysisError::DataUnavailable(symbol.to_string()))
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FinancialDataSource for YahooClient {
    async fn fetch(&self, symbol: &str) -> Result<RawMetrics, AnalysisError> {
        let result = self
            .quote_summary(symbol, "summaryDetail,financialData,defaultKeyStatistics")
            .await?;

        let metrics = collect_metrics(&result);
        if metrics.is_empty() {
            return Err(AnalysisError::DataUnavailable(symbol.to_string()));
        }

        tracing::debug!(symbol, fields = metrics.values.len(), "fetched fundamentals");
        Ok(metrics)
    }

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, AnalysisError> {
        let result = self.quote_summary(symbol, "assetProfile,price").await?;
        Ok(profile_from(&result))
    }
}

/// Flatten quote-summary module fields into a `RawMetrics` map. Fields
/// arrive as `{ "raw": n, "fmt": "..." }` wrappers; only the raw value is
/// kept. Absent modules or fields produce absent keys, never errors.
fn collect_metrics(result: &serde_json::Value) -> RawMetrics {
    let mut metrics = RawMetrics::new();
    for (key, module, field) in FIELD_MAP {
        if let Some(value) = result.get(module).and_then(|m| m.get(field)) {
            let flattened = value.get("raw").unwrap_or(value);
            if !flattened.is_null() {
                metrics.insert(*key, flattened.clone());
            }
        }
    }
    metrics
}

fn profile_from(result: &serde_json::Value) -> CompanyProfile {
    let asset_profile = result.get("assetProfile");
    let price = result.get("price");

    let text = |module: Option<&serde_json::Value>, field: &str| -> Option<String> {
        module
            .and_then(|m| m.get(field))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    CompanyProfile {
        name: text(price, "longName").or_else(|| text(price, "shortName")),
        sector: text(asset_profile, "sector"),
        industry: text(asset_profile, "industry"),
        website: text(asset_profile, "website"),
        summary: text(asset_profile, "longBusinessSummary"),
        employees: asset_profile
            .and_then(|m| m.get("fullTimeEmployees"))
            .and_then(|v| v.as_i64()),
        city: text(asset_profile, "city"),
        country: text(asset_profile, "country"),
    }
}
