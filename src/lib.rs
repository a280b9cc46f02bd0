pub mod config;
pub mod fetcher;
pub mod runner;
pub mod types;
