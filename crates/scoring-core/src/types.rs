use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw named metrics as returned by a financial data provider.
///
/// Keys are the canonical snake_case metric names (`pe_ratio`, `roe`, ...);
/// values are whatever JSON the provider produced — a number, a numeric
/// string, a `{ "raw": n, "fmt": "..." }` wrapper, or null. Any key may be
/// absent. `MetricNormalizer` is the only consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    #[serde(flatten)]
    pub values: HashMap<String, serde_json::Value>,
}

impl RawMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalized snapshot of the ten scored fundamentals.
///
/// Every field is a finite number once normalization has run; missing or
/// malformed provider values have already been replaced by defaults.
/// Units: `roe`, `profit_margin`, and `revenue_growth` are fractions
/// (0.15 = 15%), `dividend_yield` is percentage points, and
/// `debt_to_equity` is in provider units (120 meaning a ratio of 1.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    pub roe: f64,
    pub debt_to_equity: f64,
    pub current_ratio: f64,
    pub profit_margin: f64,
    pub dividend_yield: f64,
    pub revenue_growth: f64,
    pub eps: f64,
    pub beta: f64,
}

impl Default for MetricRecord {
    fn default() -> Self {
        Self {
            pe_ratio: 0.0,
            pb_ratio: 0.0,
            roe: 0.0,
            debt_to_equity: 0.0,
            current_ratio: 0.0,
            profit_margin: 0.0,
            dividend_yield: 0.0,
            revenue_growth: 0.0,
            eps: 0.0,
            // A stock we know nothing about is assumed market-correlated.
            beta: 1.0,
        }
    }
}

/// Score assigned to a single fundamental parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterScore {
    /// Canonical metric key, e.g. `pe_ratio`.
    pub name: String,
    /// Display name, e.g. `P/E Ratio`.
    pub label: String,
    /// Value as displayed, after unit conversion (ROE in percent, debt to
    /// equity as a plain ratio).
    pub value: f64,
    /// One of 0, 2, 4, 5, 7, 10.
    pub score: u8,
    pub weight: f64,
}

/// Investment recommendation derived from the weighted overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Weak,
    Avoid,
}

impl Recommendation {
    /// Classify a weighted overall score. Lower bounds are inclusive and
    /// the bands partition [0, 10] without overlap.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 8.0 => Recommendation::StrongBuy,
            s if s >= 6.5 => Recommendation::Buy,
            s if s >= 5.0 => Recommendation::Hold,
            s if s >= 3.0 => Recommendation::Weak,
            _ => Recommendation::Avoid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Weak => "WEAK",
            Recommendation::Avoid => "AVOID",
        }
    }

    pub fn rationale(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Excellent fundamentals for long-term investment",
            Recommendation::Buy => "Good fundamentals, suitable for long-term",
            Recommendation::Hold => "Average fundamentals, monitor closely",
            Recommendation::Weak => "Below average fundamentals, risky for long-term",
            Recommendation::Avoid => "Poor fundamentals, not recommended",
        }
    }
}

/// Ordered scores for the fixed ten parameters plus the weighted verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub parameters: Vec<ParameterScore>,
    /// Weighted mean of the parameter scores, rounded to two decimals.
    pub overall_score: f64,
    pub recommendation: Recommendation,
}

/// Basic company information from the data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    pub employees: Option<i64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Complete per-symbol analysis as served to API consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub profile: Option<CompanyProfile>,
    pub metrics: MetricRecord,
    pub scoreboard: ScoreBoard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_band_edges() {
        assert_eq!(Recommendation::from_score(10.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(8.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(7.99), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(6.5), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(6.49), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(5.0), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(3.0), Recommendation::Weak);
        assert_eq!(Recommendation::from_score(2.99), Recommendation::Avoid);
        assert_eq!(Recommendation::from_score(0.0), Recommendation::Avoid);
    }

    #[test]
    fn test_recommendation_labels() {
        assert_eq!(Recommendation::StrongBuy.label(), "STRONG BUY");
        assert_eq!(Recommendation::Avoid.label(), "AVOID");
        assert_eq!(
            Recommendation::Hold.rationale(),
            "Average fundamentals, monitor closely"
        );
    }

    #[test]
    fn test_metric_record_defaults() {
        let record = MetricRecord::default();
        assert_eq!(record.pe_ratio, 0.0);
        assert_eq!(record.dividend_yield, 0.0);
        assert_eq!(record.beta, 1.0);
    }
}
