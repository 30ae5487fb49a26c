pub mod analyzers;
pub mod chart;
pub mod config;
pub mod filter;
pub mod loader;
pub mod output;
pub mod render;
pub mod schema;
