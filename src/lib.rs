pub mod config;
pub mod evaluation;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod stats;
pub mod telemetry;
