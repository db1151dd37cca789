//! Markdown and JSON report generation.
//!
//! The Markdown report is assembled section by section; the JSON artifacts
//! mirror the pipeline outputs for downstream consumption.

use crate::analysis::trends::comparison_rows;
use crate::analysis::{AnalysisResults, SegmentMetrics};
use crate::models::{CreativeSet, EvaluatedInsight, Plan};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Generate the full Markdown report.
pub fn generate_markdown_report(
    query: &str,
    model: &str,
    plan: &Plan,
    results: &AnalysisResults,
    insights: &[EvaluatedInsight],
    creatives: &CreativeSet,
) -> String {
    let mut report = String::new();

    report.push_str(&generate_header(query, model, results));
    report.push_str(&generate_executive_summary(results));
    report.push_str(&generate_plan_section(plan));
    report.push_str(&generate_period_comparison(results));
    report.push_str(&generate_campaign_section(results));
    report.push_str(&generate_creative_section(results));
    report.push_str(&generate_geo_section(results));
    report.push_str(&generate_insights_section(insights));
    report.push_str(&generate_creatives_section(creatives));
    report.push_str(&generate_next_steps(insights));
    report.push_str(&generate_footer(model));

    report
}

fn generate_header(query: &str, model: &str, results: &AnalysisResults) -> String {
    let summary = &results.summary;
    let mut section = String::new();

    section.push_str("# 📊 Facebook Ads Performance Analysis Report\n\n");
    section.push_str("| | |\n");
    section.push_str("|---|---|\n");
    section.push_str(&format!(
        "| **Generated** | {} |\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("| **Query** | {} |\n", query));
    section.push_str(&format!("| **Model** | {} |\n", model));
    section.push_str(&format!("| **Rows Analyzed** | {} |\n", summary.total_rows));
    section.push_str(&format!(
        "| **Date Range** | {} to {} ({} days) |\n",
        summary.date_range.start, summary.date_range.end, summary.date_range.days
    ));
    section.push('\n');

    section
}

fn generate_executive_summary(results: &AnalysisResults) -> String {
    let summary = &results.summary;
    let mut section = String::new();

    section.push_str("## Executive Summary\n\n");
    section.push_str("| Metric | Value | Rating |\n");
    section.push_str("|--------|-------|--------|\n");
    section.push_str(&format!(
        "| Total Spend | ${:.2} | - |\n",
        summary.total_spend
    ));
    section.push_str(&format!(
        "| Total Revenue | ${:.2} | - |\n",
        summary.total_revenue
    ));
    section.push_str(&format!(
        "| Overall ROAS | {:.2} | {} |\n",
        summary.overall_roas,
        roas_rating(summary.overall_roas)
    ));
    section.push_str(&format!(
        "| Campaigns | {} | - |\n| Ad Sets | {} | - |\n",
        summary.campaigns, summary.adsets
    ));
    section.push('\n');
    section.push_str(&format!(
        "Rolling {}-day trends: ROAS **{:?}**, CTR **{:?}**.\n\n",
        results.rolling_trends.window,
        results.rolling_trends.roas_trend_direction,
        results.rolling_trends.ctr_trend_direction
    ));

    section
}

fn generate_plan_section(plan: &Plan) -> String {
    let mut section = String::new();

    section.push_str("## Analysis Plan\n\n");
    section.push_str(&format!("**Objective:** {}\n\n", plan.objective));

    for step in &plan.steps {
        section.push_str(&format!("{}. {}\n", step.step_number, step.action));
    }
    if !plan.success_criteria.is_empty() {
        section.push_str(&format!(
            "\n**Success criteria:** {}\n",
            plan.success_criteria
        ));
    }
    if let Some(ref error) = plan.error {
        section.push_str(&format!("\n> ⚠️ Planner fallback used: {}\n", error));
    }
    section.push('\n');

    section
}

fn generate_period_comparison(results: &AnalysisResults) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Period Comparison (Last {} Days vs Previous)\n\n",
        results.rolling_trends.window
    ));
    section.push_str("| Metric | Current | Previous | Change | Trend |\n");
    section.push_str("|--------|---------|----------|--------|-------|\n");

    for (name, current, previous, change) in comparison_rows(&results.recent_trends) {
        section.push_str(&format!(
            "| {} | {:.2} | {:.2} | {:+.1}% | {} |\n",
            name,
            current,
            previous,
            change,
            trend_annotation(change)
        ));
    }
    section.push('\n');

    section
}

fn generate_campaign_section(results: &AnalysisResults) -> String {
    let mut section = String::new();

    section.push_str("## Campaign Performance\n\n");
    section.push_str("### Top Campaigns by ROAS\n\n");
    section.push_str(&segment_table(&results.campaign_level.top));

    if !results.campaign_level.bottom.is_empty() {
        section.push_str("### Underperforming Campaigns\n\n");
        section.push_str(&segment_table(&results.campaign_level.bottom));
    }

    section
}

fn generate_creative_section(results: &AnalysisResults) -> String {
    let mut section = String::new();

    section.push_str("## Creative Performance Matrix\n\n");
    section.push_str("| Format | Spend | Revenue | ROAS | CTR | Grade |\n");
    section.push_str("|--------|-------|---------|------|-----|-------|\n");

    for group in &results.creative_level.type_performance {
        section.push_str(&format!(
            "| {} | ${:.2} | ${:.2} | {:.2} | {:.2}% | {} |\n",
            group.segment,
            group.metrics.spend,
            group.metrics.revenue,
            group.metrics.roas,
            group.metrics.ctr,
            creative_grade(group.metrics.roas)
        ));
    }
    section.push('\n');

    if !results.creative_level.top_messages.is_empty() {
        section.push_str("### Top Messages by ROAS\n\n");
        section.push_str(&segment_table(&results.creative_level.top_messages));
    }

    section
}

fn generate_geo_section(results: &AnalysisResults) -> String {
    let mut section = String::new();

    section.push_str("## Geographic Performance\n\n");
    section.push_str(&segment_table(&results.geo_level.top));

    section
}

fn generate_insights_section(insights: &[EvaluatedInsight]) -> String {
    let mut section = String::new();

    section.push_str("## 🤖 AI-Generated Insights\n\n");

    if insights.is_empty() {
        section.push_str("_No insights were generated for this run._\n\n");
        return section;
    }

    let passed = insights.iter().filter(|i| i.passed).count();
    section.push_str(&format!(
        "{} of {} insights passed validation (threshold {:.0}%).\n\n",
        passed,
        insights.len(),
        insights
            .first()
            .map(|i| i.evaluation.threshold * 100.0)
            .unwrap_or(0.0)
    ));

    for (i, evaluated) in insights.iter().enumerate() {
        let insight = &evaluated.insight;
        let evaluation = &evaluated.evaluation;
        let status = if evaluated.passed {
            "✅ VALIDATED"
        } else {
            "❌ REJECTED"
        };

        section.push_str(&format!(
            "### {}. {} — {}\n\n",
            i + 1,
            insight.title,
            insight.severity.priority_label()
        ));
        section.push_str(&format!("{}\n\n", insight.description));
        section.push_str(&format!(
            "- **Status:** {} (score {:.0}%)\n",
            status,
            evaluation.overall_score * 100.0
        ));
        section.push_str(&format!(
            "- **Confidence:** {:.0}%\n",
            insight.confidence * 100.0
        ));
        section.push_str(&format!(
            "- **Score breakdown:** evidence {:.0}% · statistical {:.0}% · relevance {:.0}%\n",
            evaluation.scores.evidence_quality * 100.0,
            evaluation.scores.statistical_validity * 100.0,
            evaluation.scores.business_relevance * 100.0
        ));
        if let Some(ref comparison) = insight.evidence.comparison {
            section.push_str(&format!("- **Evidence:** {}\n", comparison));
        }
        if let Some(ref recommendation) = insight.recommendation {
            section.push_str(&format!("- **Recommendation:** {}\n", recommendation));
        }
        section.push('\n');
    }

    section
}

fn generate_creatives_section(creatives: &CreativeSet) -> String {
    let mut section = String::new();

    section.push_str("## 🎨 Creative Recommendations\n\n");

    if let Some(ref error) = creatives.error {
        section.push_str(&format!(
            "_Creative generation failed ({}); only the default testing strategy is shown._\n\n",
            error
        ));
    }

    if !creatives.creative_concepts.is_empty() {
        section.push_str("| Type | Concept | Rationale | Audience | Expected Impact |\n");
        section.push_str("|------|---------|-----------|----------|------------------|\n");
        for concept in &creatives.creative_concepts {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                concept.concept_type,
                concept.concept,
                concept.rationale,
                concept.audience.as_deref().unwrap_or("-"),
                concept.impact.as_deref().unwrap_or("-")
            ));
        }
        section.push('\n');
    }

    let strategy = &creatives.testing_strategy;
    section.push_str("### Testing Strategy\n\n");
    section.push_str("| | |\n");
    section.push_str("|---|---|\n");
    section.push_str(&format!("| **Duration** | {} |\n", strategy.duration));
    section.push_str(&format!(
        "| **Success Metrics** | {} |\n",
        strategy.success_metrics.join(", ")
    ));
    section.push_str(&format!(
        "| **Iteration Plan** | {} |\n",
        strategy.iteration_plan
    ));
    section.push('\n');

    section
}

fn generate_next_steps(insights: &[EvaluatedInsight]) -> String {
    let mut section = String::new();

    section.push_str("## Next Steps\n\n");
    section.push_str("1. Review validated insights and prioritize by severity\n");
    section.push_str("2. Launch creative tests per the testing strategy\n");
    section.push_str("3. Re-run the analysis after the test window to measure impact\n");

    let rejected = insights.iter().filter(|i| !i.passed).count();
    if rejected > 0 {
        section.push_str(&format!(
            "4. Gather more data for the {} rejected insight(s) before acting on them\n",
            rejected
        ));
    }
    section.push('\n');

    section
}

fn generate_footer(model: &str) -> String {
    format!("---\n\n*Report generated by adscope using {}*\n", model)
}

/// Render a standard segment metrics table.
fn segment_table(groups: &[SegmentMetrics]) -> String {
    let mut table = String::new();

    table.push_str("| Segment | Spend | Revenue | ROAS | CTR | CPA |\n");
    table.push_str("|---------|-------|---------|------|-----|-----|\n");
    for group in groups {
        table.push_str(&format!(
            "| {} | ${:.2} | ${:.2} | {:.2} | {:.2}% | ${:.2} |\n",
            group.segment,
            group.metrics.spend,
            group.metrics.revenue,
            group.metrics.roas,
            group.metrics.ctr,
            group.metrics.cpa
        ));
    }
    table.push('\n');

    table
}

fn roas_rating(roas: f64) -> &'static str {
    if roas >= 5.0 {
        "🌟 Excellent"
    } else if roas >= 3.0 {
        "✅ Good"
    } else {
        "⚠️ Needs Improvement"
    }
}

fn trend_annotation(change_pct: f64) -> &'static str {
    if change_pct > 5.0 {
        "📈 Strong Positive"
    } else if change_pct > 0.0 {
        "↗️ Positive"
    } else if change_pct > -5.0 {
        "↘️ Slight Decline"
    } else {
        "📉 Significant Decline"
    }
}

fn creative_grade(roas: f64) -> &'static str {
    if roas >= 6.0 {
        "A+"
    } else if roas >= 5.0 {
        "A"
    } else if roas >= 4.0 {
        "B"
    } else {
        "C"
    }
}

/// Write the evaluated insights to `<reports_dir>/insights.json`.
pub fn write_insights_json(
    reports_dir: &Path,
    query: &str,
    insights: &[EvaluatedInsight],
    results: &AnalysisResults,
) -> Result<PathBuf> {
    let path = reports_dir.join("insights.json");
    let payload = json!({
        "query": query,
        "timestamp": Utc::now().to_rfc3339(),
        "insights": insights,
        "data_summary": results.summary,
    });

    write_json(&path, &payload)?;
    Ok(path)
}

/// Write the creative recommendations to `<reports_dir>/creatives.json`.
pub fn write_creatives_json(
    reports_dir: &Path,
    query: &str,
    creatives: &CreativeSet,
    insights_used: &[EvaluatedInsight],
) -> Result<PathBuf> {
    let path = reports_dir.join("creatives.json");
    let titles: Vec<&str> = insights_used
        .iter()
        .filter(|i| i.passed)
        .map(|i| i.insight.title.as_str())
        .collect();
    let payload = json!({
        "query": query,
        "timestamp": Utc::now().to_rfc3339(),
        "creatives": creatives,
        "insights_used": titles,
    });

    write_json(&path, &payload)?;
    Ok(path)
}

fn write_json(path: &Path, payload: &serde_json::Value) -> Result<()> {
    let content = serde_json::to_string_pretty(payload)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Evaluator;
    use crate::analysis::analyze;
    use crate::analysis::test_support::record;
    use crate::models::{CreativeConcept, Evidence, Insight, Severity, TestingStrategy};

    fn sample_results() -> AnalysisResults {
        let records = vec![
            record("2024-03-01", "Alpha", 100.0, 10_000, 120, 12, 700.0),
            record("2024-03-02", "Beta", 150.0, 12_000, 90, 9, 300.0),
        ];
        analyze(&records, 7, 5)
    }

    fn sample_insights() -> Vec<EvaluatedInsight> {
        let insight = Insight {
            title: "Video ROAS leads all formats".to_string(),
            description: "Video creatives return 7.0 ROAS across 150 rows".to_string(),
            severity: Severity::High,
            confidence: 0.9,
            evidence: Evidence {
                metric: Some("roas".to_string()),
                comparison: Some("Video 7.0 vs Image 2.0".to_string()),
                sample_size: Some(150),
                statistical_significance: Some(true),
            },
            recommendation: Some("Shift budget to video".to_string()),
            error: false,
        };
        Evaluator::default().evaluate_all(&[insight])
    }

    fn sample_plan() -> Plan {
        Plan {
            user_query: "Why did ROAS drop?".to_string(),
            objective: "Explain the ROAS movement".to_string(),
            steps: vec![],
            success_criteria: String::new(),
            model_used: None,
            error: None,
        }
    }

    #[test]
    fn test_report_contains_all_sections() {
        let results = sample_results();
        let report = generate_markdown_report(
            "Why did ROAS drop?",
            "gemini-1.5-flash",
            &sample_plan(),
            &results,
            &sample_insights(),
            &CreativeSet {
                creative_concepts: vec![CreativeConcept {
                    concept_type: "UGC".to_string(),
                    concept: "Testimonials".to_string(),
                    rationale: "UGC leads CTR".to_string(),
                    audience: None,
                    impact: None,
                }],
                testing_strategy: TestingStrategy::default(),
                error: None,
            },
        );

        assert!(report.contains("# 📊 Facebook Ads Performance Analysis Report"));
        assert!(report.contains("## Executive Summary"));
        assert!(report.contains("## Period Comparison"));
        assert!(report.contains("## Campaign Performance"));
        assert!(report.contains("## Creative Performance Matrix"));
        assert!(report.contains("## Geographic Performance"));
        assert!(report.contains("## 🤖 AI-Generated Insights"));
        assert!(report.contains("## 🎨 Creative Recommendations"));
        assert!(report.contains("## Next Steps"));
        assert!(report.contains("Why did ROAS drop?"));
        assert!(report.contains("gemini-1.5-flash"));
    }

    #[test]
    fn test_report_marks_validated_insights() {
        let report = generate_markdown_report(
            "q",
            "m",
            &sample_plan(),
            &sample_results(),
            &sample_insights(),
            &CreativeSet::fallback("timeout"),
        );

        assert!(report.contains("✅ VALIDATED"));
        assert!(report.contains("🔴 HIGH PRIORITY"));
        assert!(report.contains("Creative generation failed (timeout)"));
    }

    #[test]
    fn test_report_handles_empty_insights() {
        let report = generate_markdown_report(
            "q",
            "m",
            &sample_plan(),
            &sample_results(),
            &[],
            &CreativeSet::fallback("err"),
        );
        assert!(report.contains("_No insights were generated for this run._"));
    }

    #[test]
    fn test_roas_rating_thresholds() {
        assert_eq!(roas_rating(5.0), "🌟 Excellent");
        assert_eq!(roas_rating(3.5), "✅ Good");
        assert_eq!(roas_rating(1.2), "⚠️ Needs Improvement");
    }

    #[test]
    fn test_trend_annotation_thresholds() {
        assert_eq!(trend_annotation(12.0), "📈 Strong Positive");
        assert_eq!(trend_annotation(2.0), "↗️ Positive");
        assert_eq!(trend_annotation(-2.0), "↘️ Slight Decline");
        assert_eq!(trend_annotation(-20.0), "📉 Significant Decline");
    }

    #[test]
    fn test_creative_grades() {
        assert_eq!(creative_grade(6.5), "A+");
        assert_eq!(creative_grade(5.1), "A");
        assert_eq!(creative_grade(4.2), "B");
        assert_eq!(creative_grade(1.0), "C");
    }

    #[test]
    fn test_write_insights_json() {
        let dir = tempfile::tempdir().unwrap();
        let results = sample_results();
        let path =
            write_insights_json(dir.path(), "query", &sample_insights(), &results).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["query"], "query");
        assert_eq!(parsed["insights"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["data_summary"]["total_rows"], 2);
    }

    #[test]
    fn test_write_creatives_json_lists_passed_insight_titles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_creatives_json(
            dir.path(),
            "query",
            &CreativeSet::fallback("err"),
            &sample_insights(),
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            parsed["insights_used"][0],
            "Video ROAS leads all formats"
        );
        assert_eq!(parsed["creatives"]["error"], "err");
    }
}
