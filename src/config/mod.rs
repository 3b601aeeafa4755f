pub mod parser;
pub mod types;

pub use parser::{load_or_default, parse_config};
pub use types::*;
