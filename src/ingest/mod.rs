pub mod orchestrator;

pub use orchestrator::{IngestionOrchestrator, LAST_INGESTION_KEY};
