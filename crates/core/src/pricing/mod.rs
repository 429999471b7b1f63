pub mod engine;

pub use engine::{recommend, GreedyRecommendationEngine, Recommendation, RecommendationEngine};
