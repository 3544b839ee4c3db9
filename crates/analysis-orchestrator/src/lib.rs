use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use scoring_core::{
    AnalysisError, CompanyProfile, FinancialDataSource, RawMetrics, StockAnalysis,
};
use scoring_engine::{MetricNormalizer, ScoringEngine};
use std::sync::Arc;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

const CACHE_TTL_SECS: i64 = 300; // 5 minutes

/// Ties the data source and the scoring pipeline together: fetch raw
/// fundamentals and the company profile, normalize, score, assemble a
/// `StockAnalysis`.
///
/// Provider responses are cached per symbol with a short TTL; scoring is
/// pure and cheap, so scoreboards are recomputed on every request.
pub struct AnalysisOrchestrator {
    data_source: Arc<dyn FinancialDataSource>,
    normalizer: MetricNormalizer,
    engine: ScoringEngine,
    metrics_cache: DashMap<String, CacheEntry<RawMetrics>>,
    profile_cache: DashMap<String, CacheEntry<CompanyProfile>>,
    cache_ttl: Duration,
}

impl AnalysisOrchestrator {
    /// Orchestrator backed by the public quote-summary API.
    pub fn with_yahoo() -> Self {
        Self::new(Arc::new(yahoo_client::YahooClient::new()))
    }

    pub fn new(data_source: Arc<dyn FinancialDataSource>) -> Self {
        Self {
            data_source,
            normalizer: MetricNormalizer::new(),
            engine: ScoringEngine::new(),
            metrics_cache: DashMap::new(),
            profile_cache: DashMap::new(),
            cache_ttl: Duration::seconds(CACHE_TTL_SECS),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Perform a full analysis for a symbol.
    ///
    /// A failed fundamentals fetch surfaces as `DataUnavailable` — scoring
    /// never runs on data known to be absent. A failed profile fetch only
    /// degrades the response to `profile: None`.
    pub async fn analyze(&self, symbol: &str) -> Result<StockAnalysis, AnalysisError> {
        let symbol = canonical_symbol(symbol)?;
        tracing::info!(%symbol, "starting analysis");

        let (metrics_result, profile_result) =
            tokio::join!(self.get_metrics(&symbol), self.get_profile(&symbol));

        let raw = metrics_result?;
        let profile = match profile_result {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "profile fetch failed, continuing without");
                None
            }
        };

        let metrics = self.normalizer.normalize(&raw);
        let scoreboard = self.engine.score(&metrics);

        tracing::info!(
            %symbol,
            overall_score = scoreboard.overall_score,
            recommendation = scoreboard.recommendation.label(),
            "analysis complete"
        );

        Ok(StockAnalysis {
            symbol,
            generated_at: Utc::now(),
            profile,
            metrics,
            scoreboard,
        })
    }

    async fn get_metrics(&self, symbol: &str) -> Result<RawMetrics, AnalysisError> {
        if let Some(entry) = self.metrics_cache.get(symbol) {
            if Utc::now() - entry.cached_at < self.cache_ttl {
                tracing::debug!(symbol, "fundamentals cache hit");
                return Ok(entry.data.clone());
            }
        }

        let data = self.data_source.fetch(symbol).await?;
        self.metrics_cache.insert(
            symbol.to_string(),
            CacheEntry {
                data: data.clone(),
                cached_at: Utc::now(),
            },
        );
        Ok(data)
    }

    async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile, AnalysisError> {
        if let Some(entry) = self.profile_cache.get(symbol) {
            if Utc::now() - entry.cached_at < self.cache_ttl {
                tracing::debug!(symbol, "profile cache hit");
                return Ok(entry.data.clone());
            }
        }

        let data = self.data_source.company_profile(symbol).await?;
        self.profile_cache.insert(
            symbol.to_string(),
            CacheEntry {
                data: data.clone(),
                cached_at: Utc::now(),
            },
        );
        Ok(data)
    }
}

/// Uppercase the symbol and default bare tickers to the NSE `.NS` suffix;
/// tickers already carrying an exchange suffix (`.NS`, `.BO`, ...) pass
/// through unchanged.
pub fn canonical_symbol(symbol: &str) -> Result<String, AnalysisError> {
    let trimmed = symbol.trim().to_uppercase();
    if trimmed.is_empty() {
        return Err(AnalysisError::InvalidData(
            "symbol must not be empty".to_string(),
        ));
    }
    if trimmed.contains('.') {
        Ok(trimmed)
    } else {
        Ok(format!("{trimmed}.NS"))
    }
}
