pub mod config;
pub mod dataset;
pub mod formulas;
pub mod output;
pub mod scoring;
pub mod telemetry;
pub mod weights;
