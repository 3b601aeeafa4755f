pub mod generator;

pub use generator::RecommendationGenerator;
