pub mod pacing;

pub use pacing::Pacer;
