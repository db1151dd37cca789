//! Data models for the ads analyst pipeline.
//!
//! This module contains the core data structures passed between pipeline
//! steps: plans, insights, evaluations, and creative recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low severity - informational findings
    Low,
    /// Medium severity - worth acting on
    Medium,
    /// High severity - significant performance impact
    High,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

impl Severity {
    /// Returns a priority label for the Markdown report.
    pub fn priority_label(&self) -> &'static str {
        match self {
            Severity::Low => "🟢 LOW PRIORITY",
            Severity::Medium => "🟡 MEDIUM PRIORITY",
            Severity::High => "🔴 HIGH PRIORITY",
        }
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "high" | "critical" => Severity::High,
            "low" => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

/// A single step in an analysis plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Position of the step in the plan (1-indexed).
    pub step_number: usize,
    /// What the step does.
    pub action: String,
    /// Data the step needs.
    #[serde(default)]
    pub data_needed: String,
    /// What the step is expected to produce.
    #[serde(default)]
    pub expected_output: String,
}

/// An analysis plan decomposed from the user's query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// The original user query.
    #[serde(default)]
    pub user_query: String,
    /// Objective of the analysis.
    pub objective: String,
    /// Ordered list of steps.
    pub steps: Vec<PlanStep>,
    /// What a successful analysis looks like.
    #[serde(default)]
    pub success_criteria: String,
    /// Model that produced the plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Error text if the planner call failed and this is a fallback plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Evidence backing an insight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// Metric the insight is about (e.g. "roas", "ctr").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Concrete before/after or segment-vs-segment comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
    /// Number of data points behind the claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
    /// Whether the difference is statistically significant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistical_significance: Option<bool>,
}

impl Evidence {
    /// True when no evidence field is populated.
    pub fn is_empty(&self) -> bool {
        self.metric.is_none()
            && self.comparison.is_none()
            && self.sample_size.is_none()
            && self.statistical_significance.is_none()
    }
}

/// An insight generated from the aggregated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Short title of the finding.
    pub title: String,
    /// Detailed description.
    #[serde(default)]
    pub description: String,
    /// Severity of the finding.
    #[serde(default)]
    pub severity: Severity,
    /// Model-reported confidence (0.0 - 1.0).
    #[serde(default)]
    pub confidence: f64,
    /// Evidence blob backing the finding.
    #[serde(default)]
    pub evidence: Evidence,
    /// Suggested action, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Set when the insight is a fallback produced after a failed LLM call.
    #[serde(default)]
    pub error: bool,
}

impl Insight {
    /// Creates the fallback insight used when insight generation fails.
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            title: "Error generating insights".to_string(),
            description: error.into(),
            severity: Severity::Low,
            confidence: 0.0,
            evidence: Evidence::default(),
            recommendation: None,
            error: true,
        }
    }
}

/// Per-criterion scores from the evaluator rubric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriterionScores {
    pub evidence_quality: f64,
    pub statistical_validity: f64,
    pub business_relevance: f64,
}

/// Evaluation of a single insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Scores per rubric criterion (each 0.0 - 1.0).
    pub scores: CriterionScores,
    /// Weighted overall score (0.0 - 1.0).
    pub overall_score: f64,
    /// Whether the insight clears the pass threshold.
    pub passed: bool,
    /// Threshold the score was compared against.
    pub threshold: f64,
}

/// An insight paired with its evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedInsight {
    pub insight: Insight,
    pub evaluation: Evaluation,
    pub passed: bool,
}

/// A single creative concept recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeConcept {
    /// Creative format (e.g. "Video", "Carousel", "UGC").
    #[serde(rename = "type")]
    pub concept_type: String,
    /// The creative concept itself.
    #[serde(default)]
    pub concept: String,
    /// Why this concept should work.
    #[serde(default)]
    pub rationale: String,
    /// Audience the concept targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Expected impact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// How the new creatives should be tested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingStrategy {
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub success_metrics: Vec<String>,
    #[serde(default)]
    pub iteration_plan: String,
}

impl Default for TestingStrategy {
    fn default() -> Self {
        Self {
            duration: "7-14 days".to_string(),
            success_metrics: vec!["ROAS > 5.0".to_string(), "CTR > 1.5%".to_string()],
            iteration_plan: "Test and refine based on results".to_string(),
        }
    }
}

/// The full creative recommendation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeSet {
    /// Generated creative concepts.
    #[serde(default)]
    pub creative_concepts: Vec<CreativeConcept>,
    /// Testing strategy for the concepts.
    #[serde(default)]
    pub testing_strategy: TestingStrategy,
    /// Error text if the creative call failed and this is a fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreativeSet {
    /// Creates the fallback set used when creative generation fails.
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            creative_concepts: Vec::new(),
            testing_strategy: TestingStrategy::default(),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::from("high"), Severity::High);
        assert_eq!(Severity::from("CRITICAL"), Severity::High);
        assert_eq!(Severity::from("low"), Severity::Low);
        assert_eq!(Severity::from("anything"), Severity::Medium);
    }

    #[test]
    fn test_evidence_is_empty() {
        assert!(Evidence::default().is_empty());

        let evidence = Evidence {
            metric: Some("roas".to_string()),
            ..Default::default()
        };
        assert!(!evidence.is_empty());
    }

    #[test]
    fn test_fallback_insight() {
        let insight = Insight::fallback("connection refused");
        assert!(insight.error);
        assert_eq!(insight.confidence, 0.0);
        assert_eq!(insight.severity, Severity::Low);
        assert!(insight.evidence.is_empty());
    }

    #[test]
    fn test_fallback_creative_set() {
        let set = CreativeSet::fallback("timeout");
        assert!(set.creative_concepts.is_empty());
        assert_eq!(set.testing_strategy.duration, "7-14 days");
        assert_eq!(set.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_insight_deserializes_with_partial_fields() {
        let json = r#"{"title": "ROAS dropped", "severity": "high"}"#;
        let insight: Insight = serde_json::from_str(json).unwrap();
        assert_eq!(insight.title, "ROAS dropped");
        assert_eq!(insight.severity, Severity::High);
        assert_eq!(insight.confidence, 0.0);
        assert!(!insight.error);
    }
}
