pub mod api;
pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod errors;
pub mod eval;
pub mod llm;
pub mod logging;
pub mod models;
pub mod qa;

pub use config::AppConfig;
pub use errors::*;
