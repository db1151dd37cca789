//! Report generation for analysis results.

pub mod generator;

pub use generator::{generate_markdown_report, write_creatives_json, write_insights_json};
