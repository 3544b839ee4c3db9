pub mod engine;
pub mod normalizer;

pub use engine::{score_by_threshold, Direction, ScoringEngine};
pub use normalizer::MetricNormalizer;
