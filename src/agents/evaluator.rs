//! Evaluator step: score insights against a fixed rubric.
//!
//! Purely heuristic, no model call. Three criteria are scored from the
//! insight itself and combined with fixed weights; insights below the
//! threshold are filtered out of the creative step.

use crate::models::{CriterionScores, EvaluatedInsight, Evaluation, Insight, Severity};

const EVIDENCE_WEIGHT: f64 = 0.40;
const STATISTICAL_WEIGHT: f64 = 0.35;
const RELEVANCE_WEIGHT: f64 = 0.25;

/// Sample size at which a claim starts counting as adequately backed.
const MIN_SAMPLE: u64 = 30;
/// Sample size treated as a large sample.
const LARGE_SAMPLE: u64 = 100;

/// Metric names that mark a finding as tied to business outcomes.
const CORE_METRICS: &[&str] = &[
    "roas",
    "ctr",
    "cpc",
    "cpa",
    "spend",
    "revenue",
    "purchases",
    "conversion",
];

pub struct Evaluator {
    threshold: f64,
}

impl Evaluator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Score one insight; `passed` is set when the weighted score clears
    /// the threshold.
    pub fn evaluate(&self, insight: &Insight) -> Evaluation {
        let scores = CriterionScores {
            evidence_quality: evidence_quality(insight),
            statistical_validity: statistical_validity(insight),
            business_relevance: business_relevance(insight),
        };

        let overall_score = scores.evidence_quality * EVIDENCE_WEIGHT
            + scores.statistical_validity * STATISTICAL_WEIGHT
            + scores.business_relevance * RELEVANCE_WEIGHT;

        Evaluation {
            passed: overall_score >= self.threshold,
            overall_score,
            scores,
            threshold: self.threshold,
        }
    }

    /// Evaluate a batch of insights, pairing each with its evaluation.
    pub fn evaluate_all(&self, insights: &[Insight]) -> Vec<EvaluatedInsight> {
        insights
            .iter()
            .map(|insight| {
                let evaluation = self.evaluate(insight);
                EvaluatedInsight {
                    insight: insight.clone(),
                    passed: evaluation.passed,
                    evaluation,
                }
            })
            .collect()
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(0.6)
    }
}

/// How well the claim is backed by its evidence blob.
fn evidence_quality(insight: &Insight) -> f64 {
    let evidence = &insight.evidence;
    if evidence.is_empty() {
        return 0.0;
    }

    let mut score: f64 = 0.3;
    if evidence.metric.is_some() {
        score += 0.2;
    }
    match evidence.sample_size {
        Some(n) if n >= MIN_SAMPLE => score += 0.3,
        Some(n) if n >= 10 => score += 0.15,
        _ => {}
    }
    if evidence.comparison.is_some() {
        score += 0.2;
    }

    score.min(1.0)
}

/// Whether the numbers behind the claim would survive scrutiny.
fn statistical_validity(insight: &Insight) -> f64 {
    let mut score: f64 = 0.0;

    if let Some(n) = insight.evidence.sample_size {
        if n >= MIN_SAMPLE {
            score += 0.4;
        }
        if n >= LARGE_SAMPLE {
            score += 0.1;
        }
    }
    if insight.evidence.statistical_significance == Some(true) {
        score += 0.3;
    }
    if insight.confidence >= 0.7 {
        score += 0.2;
    }

    score.min(1.0)
}

/// Whether acting on the insight would plausibly move business outcomes.
fn business_relevance(insight: &Insight) -> f64 {
    let mut score: f64 = match insight.severity {
        Severity::High => 0.4,
        Severity::Medium => 0.3,
        Severity::Low => 0.2,
    };

    if insight.recommendation.is_some() {
        score += 0.3;
    }

    let text = format!("{} {}", insight.title, insight.description).to_lowercase();
    if CORE_METRICS.iter().any(|m| text.contains(m)) {
        score += 0.3;
    }

    score.min(1.0)
}
