use scoring_core::{MetricRecord, ParameterScore, Recommendation, ScoreBoard};

/// Neutral band score handed out when a metric is unavailable.
const NEUTRAL_SCORE: u8 = 5;

/// Scoring direction for threshold-based parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Valuation/leverage ratios: a smaller value earns a higher score.
    LowerIsBetter,
    /// Profitability/growth/yield ratios: a larger value earns a higher score.
    HigherIsBetter,
}

/// Unit conversion applied to a stored metric right before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    None,
    /// Fraction to percentage points (0.15 -> 15).
    FractionToPercent,
    /// Provider percentage figure to a plain ratio (120 -> 1.2). Yahoo-style
    /// providers report debt/equity this way; the divisor is a provider
    /// calibration, not a universal constant.
    PercentToRatio,
}

impl Transform {
    fn apply(&self, value: f64) -> f64 {
        match self {
            Transform::None => value,
            Transform::FractionToPercent => value * 100.0,
            Transform::PercentToRatio => value / 100.0,
        }
    }
}

struct ParameterRule {
    name: &'static str,
    label: &'static str,
    thresholds: [f64; 5],
    direction: Direction,
    weight: f64,
    transform: Transform,
    extract: fn(&MetricRecord) -> f64,
}

/// The nine threshold-scored fundamentals, in display order. Thresholds are
/// tuned for long-term holdings on NSE/BSE listings. Beta is scored by its
/// own rule below and is not part of this table.
const THRESHOLD_PARAMETERS: [ParameterRule; 9] = [
    ParameterRule {
        name: "pe_ratio",
        label: "P/E Ratio",
        thresholds: [0.0, 15.0, 25.0, 35.0, 50.0],
        direction: Direction::LowerIsBetter,
        weight: 1.2,
        transform: Transform::None,
        extract: |m| m.pe_ratio,
    },
    ParameterRule {
        name: "pb_ratio",
        label: "P/B Ratio",
        thresholds: [0.0, 1.0, 3.0, 5.0, 10.0],
        direction: Direction::LowerIsBetter,
        weight: 1.0,
        transform: Transform::None,
        extract: |m| m.pb_ratio,
    },
    ParameterRule {
        name: "roe",
        label: "Return on Equity (ROE)",
        thresholds: [0.0, 10.0, 15.0, 20.0, 25.0],
        direction: Direction::HigherIsBetter,
        weight: 1.5,
        transform: Transform::FractionToPercent,
        extract: |m| m.roe,
    },
    ParameterRule {
        name: "debt_to_equity",
        label: "Debt to Equity",
        thresholds: [0.0, 0.5, 1.0, 2.0, 3.0],
        direction: Direction::LowerIsBetter,
        weight: 1.3,
        transform: Transform::PercentToRatio,
        extract: |m| m.debt_to_equity,
    },
    ParameterRule {
        name: "current_ratio",
        label: "Current Ratio",
        thresholds: [0.0, 1.0, 1.5, 2.0, 2.5],
        direction: Direction::HigherIsBetter,
        weight: 0.8,
        transform: Transform::None,
        extract: |m| m.current_ratio,
    },
    ParameterRule {
        name: "profit_margin",
        label: "Profit Margin",
        thresholds: [0.0, 5.0, 10.0, 15.0, 20.0],
        direction: Direction::HigherIsBetter,
        weight: 1.2,
        transform: Transform::FractionToPercent,
        extract: |m| m.profit_margin,
    },
    ParameterRule {
        name: "dividend_yield",
        label: "Dividend Yield",
        thresholds: [0.0, 1.0, 2.0, 3.0, 4.0],
        direction: Direction::HigherIsBetter,
        weight: 0.9,
        transform: Transform::None,
        extract: |m| m.dividend_yield,
    },
    ParameterRule {
        name: "revenue_growth",
        label: "Revenue Growth",
        thresholds: [-10.0, 5.0, 10.0, 15.0, 20.0],
        direction: Direction::HigherIsBetter,
        weight: 1.1,
        transform: Transform::FractionToPercent,
        extract: |m| m.revenue_growth,
    },
    ParameterRule {
        name: "eps",
        label: "Earnings Per Share (EPS)",
        thresholds: [0.0, 5.0, 10.0, 20.0, 30.0],
        direction: Direction::HigherIsBetter,
        weight: 1.0,
        transform: Transform::None,
        extract: |m| m.eps,
    },
];

const BETA_WEIGHT: f64 = 0.7;

/// Map a metric value onto the discrete band scale via an ascending
/// five-element boundary list.
///
/// A value of exactly 0.0 is the missing-data sentinel and scores the
/// neutral 5 rather than 0, so stocks with unavailable metrics are not
/// penalized as if they had failed the test. This is deliberate policy,
/// not an oversight. Boundary ties resolve to the lower-scoring band.
pub fn score_by_threshold(value: f64, thresholds: &[f64; 5], direction: Direction) -> u8 {
    if value == 0.0 {
        return NEUTRAL_SCORE;
    }

    match direction {
        Direction::LowerIsBetter => {
            if value >= thresholds[4] {
                0
            } else if value >= thresholds[3] {
                2
            } else if value >= thresholds[2] {
                4
            } else if value >= thresholds[1] {
                7
            } else {
                10
            }
        }
        Direction::HigherIsBetter => {
            if value <= thresholds[0] {
                0
            } else if value <= thresholds[1] {
                2
            } else if value <= thresholds[2] {
                4
            } else if value <= thresholds[3] {
                7
            } else {
                10
            }
        }
    }
}

/// Beta is scored on proximity to 1.0 rather than by thresholds: a stock
/// that moves with the market suits a steady long-term holding. Extreme
/// beta lands on the neutral score, reflecting lower confidence rather
/// than active avoidance.
fn beta_score(beta: f64) -> u8 {
    if (0.8..=1.2).contains(&beta) {
        10
    } else if (0.5..=1.5).contains(&beta) {
        7
    } else {
        NEUTRAL_SCORE
    }
}

/// Turns a normalized `MetricRecord` into a `ScoreBoard`: per-parameter
/// band scores, the weighted overall score, and the recommendation.
///
/// Scoring is pure, synchronous computation over the fixed parameter
/// table; concurrent callers need no coordination.
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, metrics: &MetricRecord) -> ScoreBoard {
        let mut parameters: Vec<ParameterScore> =
            Vec::with_capacity(THRESHOLD_PARAMETERS.len() + 1);

        for rule in &THRESHOLD_PARAMETERS {
            let value = rule.transform.apply((rule.extract)(metrics));
            parameters.push(ParameterScore {
                name: rule.name.to_string(),
                label: rule.label.to_string(),
                value,
                score: score_by_threshold(value, &rule.thresholds, rule.direction),
                weight: rule.weight,
            });
        }

        parameters.push(ParameterScore {
            name: "beta".to_string(),
            label: "Beta (Volatility)".to_string(),
            value: metrics.beta,
            score: beta_score(metrics.beta),
            weight: BETA_WEIGHT,
        });

        let overall_score = Self::overall_score(&parameters);
        let recommendation = Recommendation::from_score(overall_score);

        tracing::debug!(
            overall_score,
            recommendation = recommendation.label(),
            "scored metric record"
        );

        ScoreBoard {
            parameters,
            overall_score,
            recommendation,
        }
    }

    /// Weighted mean of the parameter scores, rounded to two decimals.
    /// Zero total weight cannot occur with the fixed table but degrades to
    /// the neutral score rather than dividing by zero.
    fn overall_score(parameters: &[ParameterScore]) -> f64 {
        let total_weight: f64 = parameters.iter().map(|p| p.weight).sum();
        if total_weight <= 0.0 {
            return f64::from(NEUTRAL_SCORE);
        }

        let weighted: f64 = parameters
            .iter()
            .map(|p| f64::from(p.score) * p.weight)
            .sum();
        ((weighted / total_weight) * 100.0).round() / 100.0
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PE_THRESHOLDS: [f64; 5] = [0.0, 15.0, 25.0, 35.0, 50.0];
    const ROE_THRESHOLDS: [f64; 5] = [0.0, 10.0, 15.0, 20.0, 25.0];

    fn sample_record() -> MetricRecord {
        MetricRecord {
            pe_ratio: 18.0,
            pb_ratio: 2.0,
            roe: 0.18,
            debt_to_equity: 80.0,
            current_ratio: 1.8,
            profit_margin: 0.12,
            dividend_yield: 2.5,
            revenue_growth: 0.12,
            eps: 15.0,
            beta: 1.0,
        }
    }

    #[test]
    fn test_lower_is_better_bands() {
        assert_eq!(
            score_by_threshold(55.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            0
        );
        assert_eq!(
            score_by_threshold(40.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            2
        );
        assert_eq!(
            score_by_threshold(30.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            4
        );
        assert_eq!(
            score_by_threshold(18.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            7
        );
        assert_eq!(
            score_by_threshold(12.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            10
        );
    }

    #[test]
    fn test_higher_is_better_bands() {
        assert_eq!(
            score_by_threshold(-2.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            0
        );
        assert_eq!(
            score_by_threshold(8.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            2
        );
        assert_eq!(
            score_by_threshold(12.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            4
        );
        assert_eq!(
            score_by_threshold(18.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            7
        );
        assert_eq!(
            score_by_threshold(30.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            10
        );
    }

    #[test]
    fn test_boundary_ties_take_lower_band() {
        // Exact boundary hits must land on the lower-scoring side.
        assert_eq!(
            score_by_threshold(25.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            4
        );
        assert_eq!(
            score_by_threshold(50.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            0
        );
        assert_eq!(
            score_by_threshold(15.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            7
        );
        assert_eq!(
            score_by_threshold(15.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            4
        );
        assert_eq!(
            score_by_threshold(25.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            7
        );
    }

    #[test]
    fn test_zero_value_scores_neutral() {
        assert_eq!(
            score_by_threshold(0.0, &PE_THRESHOLDS, Direction::LowerIsBetter),
            5
        );
        assert_eq!(
            score_by_threshold(0.0, &ROE_THRESHOLDS, Direction::HigherIsBetter),
            5
        );
        // Holds even when 0 sits inside a real band, as with the revenue
        // growth boundaries starting at -10.
        assert_eq!(
            score_by_threshold(
                0.0,
                &[-10.0, 5.0, 10.0, 15.0, 20.0],
                Direction::HigherIsBetter
            ),
            5
        );
    }

    #[test]
    fn test_beta_boundaries() {
        assert_eq!(beta_score(1.0), 10);
        assert_eq!(beta_score(0.8), 10);
        assert_eq!(beta_score(1.2), 10);
        assert_eq!(beta_score(0.79), 7);
        assert_eq!(beta_score(0.5), 7);
        assert_eq!(beta_score(1.5), 7);
        assert_eq!(beta_score(0.49), 5);
        assert_eq!(beta_score(1.51), 5);
        assert_eq!(beta_score(-0.3), 5);
    }

    #[test]
    fn test_scoreboard_ordering_and_scores() {
        let board = ScoringEngine::new().score(&sample_record());

        let names: Vec<&str> = board.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "pe_ratio",
                "pb_ratio",
                "roe",
                "debt_to_equity",
                "current_ratio",
                "profit_margin",
                "dividend_yield",
                "revenue_growth",
                "eps",
                "beta",
            ]
        );

        let scores: Vec<u8> = board.parameters.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![7, 7, 7, 7, 7, 7, 7, 7, 7, 10]);
    }

    #[test]
    fn test_unit_transforms_applied_at_scoring() {
        let board = ScoringEngine::new().score(&sample_record());

        let by_name = |name: &str| {
            board
                .parameters
                .iter()
                .find(|p| p.name == name)
                .unwrap()
                .clone()
        };

        // ROE 0.18 displays as 18%, debt/equity 80 as a 0.8 ratio.
        assert!((by_name("roe").value - 18.0).abs() < 1e-9);
        assert!((by_name("debt_to_equity").value - 0.8).abs() < 1e-9);
        assert!((by_name("dividend_yield").value - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_overall_and_recommendation() {
        let board = ScoringEngine::new().score(&sample_record());

        // Nine sevens plus beta's ten: (7 * 10.0 + 10 * 0.7) / 10.7.
        assert!((board.overall_score - 7.2).abs() < 1e-9);
        assert_eq!(board.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_all_defaults_record_scores_neutral() {
        let board = ScoringEngine::new().score(&MetricRecord::default());

        for param in &board.parameters {
            if param.name == "beta" {
                assert_eq!(param.score, 10);
            } else {
                assert_eq!(param.score, 5);
            }
        }
        // (5 * 10.0 + 10 * 0.7) / 10.7 = 5.33, squarely a HOLD.
        assert!((board.overall_score - 5.33).abs() < 1e-9);
        assert_eq!(board.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_overall_score_stays_in_range() {
        let engine = ScoringEngine::new();

        let best = MetricRecord {
            pe_ratio: 10.0,
            pb_ratio: 0.5,
            roe: 0.40,
            debt_to_equity: 20.0,
            current_ratio: 3.0,
            profit_margin: 0.30,
            dividend_yield: 5.0,
            revenue_growth: 0.30,
            eps: 40.0,
            beta: 1.0,
        };
        let board = engine.score(&best);
        assert_eq!(board.overall_score, 10.0);
        assert_eq!(board.recommendation, Recommendation::StrongBuy);

        let worst = MetricRecord {
            pe_ratio: 80.0,
            pb_ratio: 15.0,
            roe: -0.10,
            debt_to_equity: 400.0,
            current_ratio: 0.4,
            profit_margin: -0.05,
            dividend_yield: -1.0,
            revenue_growth: -0.25,
            eps: -3.0,
            beta: 3.0,
        };
        let board = engine.score(&worst);
        assert!(board.overall_score >= 0.0 && board.overall_score <= 10.0);
        // Everything zeroes out except the 0.4 current ratio (band 2) and
        // beta's neutral floor: (2 * 0.8 + 5 * 0.7) / 10.7.
        assert!((board.overall_score - 0.48).abs() < 1e-9);
        assert_eq!(board.recommendation, Recommendation::Avoid);
    }

    #[test]
    fn test_every_score_is_a_band_value() {
        let engine = ScoringEngine::new();
        let records = [
            MetricRecord::default(),
            sample_record(),
            MetricRecord {
                pe_ratio: 25.0,
                pb_ratio: 1.0,
                roe: 0.15,
                debt_to_equity: 100.0,
                current_ratio: 1.5,
                profit_margin: 0.10,
                dividend_yield: 2.0,
                revenue_growth: -0.10,
                eps: 10.0,
                beta: 0.5,
            },
        ];

        for record in &records {
            for param in &engine.score(record).parameters {
                assert!(
                    [0, 2, 4, 5, 7, 10].contains(&param.score),
                    "{} scored {}",
                    param.name,
                    param.score
                );
            }
        }
    }
}
