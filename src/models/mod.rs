pub mod vulnerability;
pub mod analysis;
pub mod score;
pub mod recommendation;
pub mod ingestion;

pub use vulnerability::Vulnerability;
pub use analysis::{BioRelevanceAnalysis, SafetyImpact, Sector};
pub use score::{BioImpactScore, Priority};
pub use recommendation::{ActionRecommendation, RecommendationType};
pub use ingestion::{CombinedIngestionResult, IngestionResult};
