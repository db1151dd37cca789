//! Insight step: generate findings from the aggregated data.

use crate::agents::client::{strip_code_fence, AgentError, GeminiClient};
use crate::agents::prompts::{fill_prompt, INSIGHT_PROMPT};
use crate::analysis::AnalysisResults;
use crate::models::Insight;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct InsightResponse {
    #[serde(default)]
    insights: Vec<Insight>,
}

pub struct InsightAgent<'a> {
    client: &'a GeminiClient,
}

impl<'a> InsightAgent<'a> {
    pub fn new(client: &'a GeminiClient) -> Self {
        Self { client }
    }

    /// Generate insights from the analysis results.
    ///
    /// Never fails: any error yields a single fallback insight flagged with
    /// `error: true` so downstream steps and the report still have something
    /// to work with.
    pub async fn generate_insights(
        &self,
        results: &AnalysisResults,
        context: &str,
    ) -> Vec<Insight> {
        match self.request_insights(results, context).await {
            Ok(insights) if !insights.is_empty() => insights,
            Ok(_) => {
                warn!("Model returned no insights, using fallback");
                vec![Insight::fallback("Model returned no insights")]
            }
            Err(e) => {
                warn!("Insight generation failed, using fallback: {}", e);
                vec![Insight::fallback(e.to_string())]
            }
        }
    }

    async fn request_insights(
        &self,
        results: &AnalysisResults,
        context: &str,
    ) -> Result<Vec<Insight>, AgentError> {
        let data = serde_json::to_string_pretty(results)?;
        let prompt = fill_prompt(INSIGHT_PROMPT, &[("context", context), ("data", &data)]);

        let response = self.client.generate(&prompt).await?;
        let parsed: InsightResponse = serde_json::from_str(strip_code_fence(&response))?;

        Ok(parsed.insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    #[test]
    fn test_insight_response_parses() {
        let response = r#"```json
{
  "insights": [
    {
      "title": "Video outperforms Image",
      "description": "Video ROAS 6.2 vs Image 3.1 over 200 rows",
      "severity": "high",
      "confidence": 0.85,
      "evidence": {
        "metric": "roas",
        "comparison": "Video: 6.2 vs Image: 3.1",
        "sample_size": 200,
        "statistical_significance": true
      },
      "recommendation": "Shift budget toward video"
    }
  ]
}
```"#;

        let parsed: InsightResponse =
            serde_json::from_str(strip_code_fence(response)).unwrap();
        assert_eq!(parsed.insights.len(), 1);
        let insight = &parsed.insights[0];
        assert_eq!(insight.severity, Severity::High);
        assert_eq!(insight.evidence.sample_size, Some(200));
        assert_eq!(insight.evidence.statistical_significance, Some(true));
    }

    #[test]
    fn test_insight_response_missing_key_is_empty() {
        let parsed: InsightResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.insights.is_empty());
    }
}
