pub mod analyze;
pub mod commands;
pub mod ingest;
pub mod recommend;
pub mod status;

pub use commands::{Cli, Commands};

use crate::config::VigilConfig;
use crate::db::Database;
use crate::errors::VigilError;

pub const DEFAULT_DB_PATH: &str = "./data/biovigil.db";

pub(crate) fn open_database(config: &VigilConfig) -> Result<Database, VigilError> {
    let path = config
        .database
        .as_ref()
        .and_then(|d| d.path.as_deref())
        .unwrap_or(DEFAULT_DB_PATH);
    Database::new(path)
}
