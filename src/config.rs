//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.adscope.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Dataset settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Evaluation settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Gemini API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in a response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout() -> u64 {
    60
}

/// Dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the ads CSV dataset.
    #[serde(default = "default_data_path")]
    pub path: String,

    /// Rolling/comparison window in days.
    #[serde(default = "default_window_days")]
    pub window_days: usize,

    /// How many segments to keep in top/bottom performer lists.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            window_days: default_window_days(),
            top_n: default_top_n(),
        }
    }
}

fn default_data_path() -> String {
    "data/fb_ads.csv".to_string()
}

fn default_window_days() -> usize {
    7
}

fn default_top_n() -> usize {
    10
}

/// Insight evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Minimum weighted score for an insight to pass.
    #[serde(default = "default_confidence_min")]
    pub confidence_min: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            confidence_min: default_confidence_min(),
        }
    }
}

fn default_confidence_min() -> f64 {
    0.6
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory for JSON and Markdown artifacts.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Directory for execution traces.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            logs_dir: default_logs_dir(),
        }
    }
}

fn default_reports_dir() -> String {
    "reports".to_string()
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".adscope.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.temperature = args.temperature;

        // Timeout - only override if explicitly provided via CLI
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        // Dataset - only override if provided
        if let Some(ref data) = args.data {
            self.data.path = data.display().to_string();
        }
        self.data.window_days = args.window;

        // Output directories - only override if provided
        if let Some(ref reports_dir) = args.reports_dir {
            self.report.reports_dir = reports_dir.display().to_string();
        }
        if let Some(ref logs_dir) = args.logs_dir {
            self.report.logs_dir = logs_dir.display().to_string();
        }
    }

    /// Resolve the API key from the configured environment variable.
    ///
    /// An empty key is allowed; the resulting API failures are caught per
    /// step and replaced with fallbacks.
    pub fn api_key(&self) -> String {
        std::env::var(&self.model.api_key_env).unwrap_or_default()
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gemini-1.5-flash");
        assert_eq!(config.model.temperature, 0.7);
        assert_eq!(config.data.window_days, 7);
        assert_eq!(config.evaluation.confidence_min, 0.6);
        assert_eq!(config.report.reports_dir, "reports");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[model]
name = "gemini-1.5-pro"
temperature = 0.3
max_tokens = 4000

[data]
path = "data/custom.csv"
window_days = 14

[evaluation]
confidence_min = 0.7
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.model.name, "gemini-1.5-pro");
        assert_eq!(config.model.temperature, 0.3);
        assert_eq!(config.model.max_tokens, 4000);
        assert_eq!(config.data.path, "data/custom.csv");
        assert_eq!(config.data.window_days, 14);
        assert_eq!(config.evaluation.confidence_min, 0.7);
        // Unspecified sections keep defaults.
        assert_eq!(config.report.logs_dir, "logs");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[report]"));
    }
}
