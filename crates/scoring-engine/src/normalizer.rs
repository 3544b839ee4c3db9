use scoring_core::{MetricRecord, RawMetrics};

/// Turns the loose provider payload into a fully populated `MetricRecord`.
///
/// This is the one place where malformed input is absorbed: absent keys,
/// nulls, empty strings, non-numeric content, and NaN/infinite values all
/// collapse to the field's default so that scoring can assume clean
/// numeric input. Normalization never fails.
pub struct MetricNormalizer;

impl MetricNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &RawMetrics) -> MetricRecord {
        MetricRecord {
            pe_ratio: numeric(raw, "pe_ratio", 0.0),
            pb_ratio: numeric(raw, "pb_ratio", 0.0),
            roe: numeric(raw, "roe", 0.0),
            debt_to_equity: numeric(raw, "debt_to_equity", 0.0),
            current_ratio: numeric(raw, "current_ratio", 0.0),
            profit_margin: numeric(raw, "profit_margin", 0.0),
            // Providers report the yield as a fraction (0.02 = 2%); stored
            // as percentage points so it can be scored without a transform.
            dividend_yield: numeric(raw, "dividend_yield", 0.0) * 100.0,
            revenue_growth: numeric(raw, "revenue_growth", 0.0),
            eps: numeric(raw, "eps", 0.0),
            beta: numeric(raw, "beta", 1.0),
        }
    }
}

impl Default for MetricNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric(raw: &RawMetrics, key: &str, default: f64) -> f64 {
    raw.get(key)
        .and_then(coerce)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Extract a number from the JSON shapes providers actually send: plain
/// numbers, numeric strings, and `{ "raw": n, "fmt": "..." }` wrappers.
fn coerce(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Object(map) => map.get("raw").and_then(coerce),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_input_yields_defaults() {
        let record = MetricNormalizer::new().normalize(&RawMetrics::new());

        assert_eq!(record.pe_ratio, 0.0);
        assert_eq!(record.pb_ratio, 0.0);
        assert_eq!(record.roe, 0.0);
        assert_eq!(record.debt_to_equity, 0.0);
        assert_eq!(record.current_ratio, 0.0);
        assert_eq!(record.profit_margin, 0.0);
        assert_eq!(record.dividend_yield, 0.0);
        assert_eq!(record.revenue_growth, 0.0);
        assert_eq!(record.eps, 0.0);
        assert_eq!(record.beta, 1.0);
    }

    #[test]
    fn test_plain_numbers_pass_through() {
        let mut raw = RawMetrics::new();
        raw.insert("pe_ratio", json!(18.4));
        raw.insert("eps", json!(52));
        raw.insert("beta", json!(0.95));

        let record = MetricNormalizer::new().normalize(&raw);

        assert_eq!(record.pe_ratio, 18.4);
        assert_eq!(record.eps, 52.0);
        assert_eq!(record.beta, 0.95);
    }

    #[test]
    fn test_dividend_yield_converted_to_percent() {
        let mut raw = RawMetrics::new();
        raw.insert("dividend_yield", json!(0.025));

        let record = MetricNormalizer::new().normalize(&raw);

        assert!((record.dividend_yield - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_fraction_fields_not_rescaled() {
        // ROE, profit margin, and revenue growth stay as fractions here;
        // the scoring step applies the percent conversion.
        let mut raw = RawMetrics::new();
        raw.insert("roe", json!(0.18));
        raw.insert("profit_margin", json!(0.12));
        raw.insert("revenue_growth", json!(0.07));
        raw.insert("debt_to_equity", json!(120.0));

        let record = MetricNormalizer::new().normalize(&raw);

        assert_eq!(record.roe, 0.18);
        assert_eq!(record.profit_margin, 0.12);
        assert_eq!(record.revenue_growth, 0.07);
        assert_eq!(record.debt_to_equity, 120.0);
    }

    #[test]
    fn test_malformed_values_fall_back_to_defaults() {
        let mut raw = RawMetrics::new();
        raw.insert("pe_ratio", json!(null));
        raw.insert("pb_ratio", json!(""));
        raw.insert("roe", json!("not a number"));
        raw.insert("current_ratio", json!([1.5]));
        raw.insert("beta", json!({}));

        let record = MetricNormalizer::new().normalize(&raw);

        assert_eq!(record.pe_ratio, 0.0);
        assert_eq!(record.pb_ratio, 0.0);
        assert_eq!(record.roe, 0.0);
        assert_eq!(record.current_ratio, 0.0);
        assert_eq!(record.beta, 1.0);
    }

    #[test]
    fn test_numeric_strings_and_raw_wrappers_parse() {
        let mut raw = RawMetrics::new();
        raw.insert("pe_ratio", json!(" 21.5 "));
        raw.insert("eps", json!({"raw": 33.2, "fmt": "33.20"}));

        let record = MetricNormalizer::new().normalize(&raw);

        assert_eq!(record.pe_ratio, 21.5);
        assert_eq!(record.eps, 33.2);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut raw = RawMetrics::new();
        // JSON has no NaN literal; a string carrying one must not leak in.
        raw.insert("pe_ratio", json!("NaN"));
        raw.insert("pb_ratio", json!("inf"));

        let record = MetricNormalizer::new().normalize(&raw);

        assert_eq!(record.pe_ratio, 0.0);
        assert_eq!(record.pb_ratio, 0.0);
    }
}
