//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

/// LLM-powered Facebook Ads performance analyst
#[derive(Parser, Debug)]
#[command(name = "adscope")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Natural-language question to analyze (e.g. "Why did ROAS drop last week?")
    #[arg(required_unless_present = "init_config")]
    pub query: Option<String>,

    /// Path to config file (default: .adscope.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the ads CSV dataset (overrides config)
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long, env = "ADSCOPE_MODEL", default_value = "gemini-1.5-flash")]
    pub model: String,

    /// Temperature for generation (0.0 - 1.0)
    #[arg(short, long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Request timeout in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Rolling/comparison window in days
    #[arg(short, long, default_value_t = 7)]
    pub window: usize,

    /// Directory for JSON and Markdown reports (overrides config)
    #[arg(long, value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,

    /// Directory for execution traces (overrides config)
    #[arg(long, value_name = "DIR")]
    pub logs_dir: Option<PathBuf>,

    /// Aggregate the dataset and print the summary without any model calls
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .adscope.toml and exit
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Validate argument combinations.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }

        if self.window == 0 {
            return Err("Window must be at least 1 day".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Dataset not found: {}", data.display()));
            }
        }

        if let Some(ref config) = self.config {
            if !config.exists() {
                return Err(format!("Config file not found: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Get the log level based on the verbosity flags.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            query: Some("Why did ROAS drop?".to_string()),
            config: None,
            data: None,
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            timeout: None,
            window: 7,
            reports_dir: None,
            logs_dir: None,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_invalid_temperature() {
        let mut args = make_args();
        args.temperature = 1.5;
        assert!(args.validate().is_err());

        args.temperature = -0.1;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut args = make_args();
        args.window = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_missing_dataset_rejected() {
        let mut args = make_args();
        args.data = Some(PathBuf::from("/nonexistent/ads.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_levels() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_query_positional() {
        let args = Args::parse_from(["adscope", "Why did CTR fall?"]);
        assert_eq!(args.query.as_deref(), Some("Why did CTR fall?"));
        assert_eq!(args.window, 7);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_init_config_without_query() {
        let args = Args::parse_from(["adscope", "--init-config"]);
        assert!(args.init_config);
        assert!(args.query.is_none());
    }
}
