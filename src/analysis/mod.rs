pub mod keywords;
pub mod safety;
pub mod analyzer;

pub use analyzer::RelevanceAnalyzer;
