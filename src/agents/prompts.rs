//! Prompt templates for the generative steps.
//!
//! Templates use `{placeholder}` markers filled with `fill_prompt`. Each
//! prompt instructs the model to answer with bare JSON; the response is
//! still defensively unfenced before parsing.

/// System preamble shared by every call.
const ALWAYS_JSON: &str = "Always return valid JSON with no surrounding text.";

/// Planner: decompose the user query into an analysis plan.
pub const PLANNER_PROMPT: &str = r#"You are a strategic planner for marketing analytics. {always_json}

Decompose the following analytics query into a structured analysis plan for a
Facebook Ads performance dataset (metrics: spend, impressions, clicks,
purchases, revenue; dimensions: campaign, ad set, creative type, creative
message, platform, country, audience type).

Query: {query}

Respond with a JSON object of this shape:
{
  "objective": "one sentence describing the analysis goal",
  "steps": [
    {
      "step_number": 1,
      "action": "what to do",
      "data_needed": "which slices or metrics",
      "expected_output": "what this step produces"
    }
  ],
  "success_criteria": "what makes the analysis successful"
}"#;

/// Insight generation over the aggregated analysis results.
pub const INSIGHT_PROMPT: &str = r#"You are an expert marketing analyst. {always_json}

{context}

Analyze the aggregated Facebook Ads performance data below. Identify 3-5
specific, actionable insights: performance trends, anomalies, strong or weak
segments, and budget-allocation opportunities. Back every insight with
concrete numbers from the data.

Data:
{data}

Respond with a JSON object of this shape:
{
  "insights": [
    {
      "title": "short finding",
      "description": "detailed explanation with numbers",
      "severity": "low|medium|high",
      "confidence": 0.0,
      "evidence": {
        "metric": "roas",
        "comparison": "segment A: X vs segment B: Y",
        "sample_size": 0,
        "statistical_significance": false
      },
      "recommendation": "suggested action"
    }
  ]
}"#;

/// Creative recommendations from validated insights.
pub const CREATIVE_PROMPT: &str = r#"You are a creative strategist for Facebook ads. {always_json}

Based on the validated performance insights and current creative performance
below, propose 3-5 new ad creative concepts worth testing.

Validated insights:
{insights}

Creative performance data:
{creative_data}

Respond with a JSON object of this shape:
{
  "creative_concepts": [
    {
      "type": "Video|Image|Carousel|UGC",
      "concept": "the creative idea",
      "rationale": "why this should work, tied to the insights",
      "audience": "who it targets",
      "impact": "expected effect"
    }
  ],
  "testing_strategy": {
    "duration": "7-14 days",
    "success_metrics": ["ROAS > 5.0", "CTR > 1.5%"],
    "iteration_plan": "how to iterate"
  }
}"#;

/// Fill `{placeholder}` markers in a template.
///
/// The shared `{always_json}` marker is filled automatically.
pub fn fill_prompt(template: &str, values: &[(&str, &str)]) -> String {
    let mut filled = template.replace("{always_json}", ALWAYS_JSON);
    for (key, value) in values {
        filled = filled.replace(&format!("{{{}}}", key), value);
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_prompt_replaces_placeholders() {
        let filled = fill_prompt(PLANNER_PROMPT, &[("query", "Analyze ROAS trends")]);
        assert!(filled.contains("Analyze ROAS trends"));
        assert!(!filled.contains("{query}"));
        assert!(filled.contains(ALWAYS_JSON));
    }

    #[test]
    fn test_fill_prompt_leaves_json_shape_braces() {
        let filled = fill_prompt(PLANNER_PROMPT, &[("query", "q")]);
        // The response-shape example is part of the prompt, not a placeholder.
        assert!(filled.contains("\"objective\""));
        assert!(filled.contains("\"steps\""));
    }

    #[test]
    fn test_fill_prompt_multiple_values() {
        let filled = fill_prompt(
            INSIGHT_PROMPT,
            &[("context", "Focus: ROAS"), ("data", "{\"rows\": 10}")],
        );
        assert!(filled.contains("Focus: ROAS"));
        assert!(filled.contains("{\"rows\": 10}"));
    }
}
