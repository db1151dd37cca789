//! Execution trace logging.
//!
//! Records every pipeline step with input/output snapshots and durations,
//! and writes the ordered trace to `logs/trace_<timestamp>.json`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One recorded pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_name: String,
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub input: Value,
    pub output: Value,
    pub duration_seconds: f64,
}

/// Trace metadata recorded once per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceMetadata {
    pub query: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TraceFile {
    metadata: TraceMetadata,
    execution_start: Option<DateTime<Utc>>,
    execution_end: Option<DateTime<Utc>>,
    total_steps: usize,
    steps: Vec<TraceStep>,
}

/// Ordered step trace for one pipeline execution.
#[derive(Debug, Default)]
pub struct ExecutionTrace {
    metadata: TraceMetadata,
    steps: Vec<TraceStep>,
}

impl ExecutionTrace {
    pub fn new(query: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            metadata: TraceMetadata {
                query: query.into(),
                model: model.into(),
            },
            steps: Vec::new(),
        }
    }

    /// Record one step. Inputs and outputs are snapshotted as JSON; a value
    /// that fails to serialize is stored as its debug string rather than
    /// aborting the trace.
    pub fn log_step<I, O>(
        &mut self,
        step_name: &str,
        agent: &str,
        input: &I,
        output: &O,
        duration_seconds: f64,
    ) where
        I: Serialize + std::fmt::Debug,
        O: Serialize + std::fmt::Debug,
    {
        self.steps.push(TraceStep {
            step_name: step_name.to_string(),
            agent: agent.to_string(),
            timestamp: Utc::now(),
            input: snapshot(input),
            output: snapshot(output),
            duration_seconds,
        });
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Write the trace to `<logs_dir>/trace_<YYYYMMDD_HHMMSS>.json`.
    pub fn save(&self, logs_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(logs_dir)
            .with_context(|| format!("Failed to create logs dir: {}", logs_dir.display()))?;

        let filename = format!("trace_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = logs_dir.join(filename);

        let file = TraceFile {
            metadata: self.metadata.clone(),
            execution_start: self.steps.first().map(|s| s.timestamp),
            execution_end: self.steps.last().map(|s| s.timestamp),
            total_steps: self.steps.len(),
            steps: self.steps.clone(),
        };

        let content = serde_json::to_string_pretty(&file)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write trace: {}", path.display()))?;

        Ok(path)
    }
}

fn snapshot<T: Serialize + std::fmt::Debug>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{:?}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_step_records_order() {
        let mut trace = ExecutionTrace::new("query", "gemini-1.5-flash");

        trace.log_step("create_plan", "planner_agent", &"q", &"plan", 0.5);
        trace.log_step("analyze_data", "data_agent", &"q", &"summary", 0.1);

        assert_eq!(trace.step_count(), 2);
        assert_eq!(trace.steps[0].step_name, "create_plan");
        assert_eq!(trace.steps[1].agent, "data_agent");
    }

    #[test]
    fn test_save_writes_trace_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut trace = ExecutionTrace::new("query", "model");
        trace.log_step("create_plan", "planner_agent", &"in", &"out", 1.0);

        let path = trace.save(dir.path()).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("trace_"));

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["total_steps"], 1);
        assert_eq!(parsed["metadata"]["query"], "query");
        assert_eq!(parsed["steps"][0]["step_name"], "create_plan");
    }

    #[test]
    fn test_save_empty_trace() {
        let dir = tempfile::tempdir().unwrap();
        let trace = ExecutionTrace::new("query", "model");

        let path = trace.save(dir.path()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["total_steps"], 0);
        assert!(parsed["execution_start"].is_null());
    }
}
