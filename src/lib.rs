pub mod commands;
pub mod config;
pub mod exercise;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use exercise::ExerciseRecord;
pub use transform::{TransformError, transform_output, transform_output_with};
