pub mod analysis;
pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod feeds;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod recommend;
pub mod scoring;
pub mod utils;
