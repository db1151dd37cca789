//! Planner step: decompose the user query into an analysis plan.

use crate::agents::client::{strip_code_fence, AgentError, GeminiClient};
use crate::agents::prompts::{fill_prompt, PLANNER_PROMPT};
use crate::models::{Plan, PlanStep};
use tracing::warn;

pub struct PlannerAgent<'a> {
    client: &'a GeminiClient,
}

impl<'a> PlannerAgent<'a> {
    pub fn new(client: &'a GeminiClient) -> Self {
        Self { client }
    }

    /// Create an analysis plan from the user query.
    ///
    /// Never fails: any error in the call or in response parsing yields the
    /// fallback plan with the error text attached.
    pub async fn create_plan(&self, user_query: &str) -> Plan {
        match self.request_plan(user_query).await {
            Ok(mut plan) => {
                plan.user_query = user_query.to_string();
                plan.model_used = Some(self.client.model_name().to_string());
                plan
            }
            Err(e) => {
                warn!("Plan generation failed, using fallback: {}", e);
                fallback_plan(user_query, &e.to_string())
            }
        }
    }

    async fn request_plan(&self, user_query: &str) -> Result<Plan, AgentError> {
        let prompt = fill_prompt(PLANNER_PROMPT, &[("query", user_query)]);
        let response = self.client.generate(&prompt).await?;
        let plan: Plan = serde_json::from_str(strip_code_fence(&response))?;
        Ok(plan)
    }
}

/// The fixed plan substituted when the planner call fails.
fn fallback_plan(user_query: &str, error: &str) -> Plan {
    Plan {
        user_query: user_query.to_string(),
        objective: "Analyze Facebook ads performance".to_string(),
        steps: vec![
            PlanStep {
                step_number: 1,
                action: "Load and examine recent data".to_string(),
                data_needed: "Last 7-14 days of ad performance".to_string(),
                expected_output: "Data summary with key metrics".to_string(),
            },
            PlanStep {
                step_number: 2,
                action: "Identify performance trends and anomalies".to_string(),
                data_needed: "ROAS, CTR, spend, revenue by segments".to_string(),
                expected_output: "List of insights with evidence".to_string(),
            },
            PlanStep {
                step_number: 3,
                action: "Generate recommendations".to_string(),
                data_needed: "Best and worst performers".to_string(),
                expected_output: "Actionable improvements".to_string(),
            },
        ],
        success_criteria: "Clear insights with data-backed recommendations".to_string(),
        model_used: None,
        error: Some(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_plan_structure() {
        let plan = fallback_plan("Analyze ROAS trends", "connection refused");

        assert_eq!(plan.user_query, "Analyze ROAS trends");
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[0].step_number, 1);
        assert_eq!(plan.error.as_deref(), Some("connection refused"));
        assert!(plan.model_used.is_none());
    }

    #[test]
    fn test_unreachable_api_yields_fallback_plan() {
        let client = GeminiClient::new(crate::agents::ClientConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            model_name: "gemini-1.5-flash".to_string(),
            api_key: "test".to_string(),
            temperature: 0.7,
            max_tokens: 100,
            timeout_seconds: 2,
        });

        let plan = tokio_test::block_on(PlannerAgent::new(&client).create_plan("test query"));

        assert_eq!(plan.steps.len(), 3);
        assert!(plan.error.is_some());
    }

    #[test]
    fn test_plan_parses_from_fenced_response() {
        let response = r#"```json
{
  "objective": "Track weekly ROAS",
  "steps": [
    {"step_number": 1, "action": "Compare periods", "data_needed": "14 days", "expected_output": "deltas"}
  ],
  "success_criteria": "deltas computed"
}
```"#;

        let plan: Plan = serde_json::from_str(strip_code_fence(response)).unwrap();
        assert_eq!(plan.objective, "Track weekly ROAS");
        assert_eq!(plan.steps.len(), 1);
    }
}
