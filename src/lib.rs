pub mod analyzer;
pub mod batcher;
pub mod cache;
pub mod client;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod utils;
