pub mod connection;
pub mod schema;
pub mod vulnerabilities;
pub mod scores;
pub mod recommendations;
pub mod settings;

pub use connection::Database;
