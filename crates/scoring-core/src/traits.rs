use crate::{AnalysisError, CompanyProfile, RawMetrics};
use async_trait::async_trait;

/// Trait for financial data providers.
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    /// Fetch raw fundamentals for a symbol. The result may cover any
    /// subset of the canonical metric keys; callers must tolerate missing
    /// or malformed fields.
    async fn fetch(&self, symbol: &str) -> Result<RawMetrics, AnalysisError>;

    /// Fetch basic company information for a symbol.
    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, AnalysisError>;
}
