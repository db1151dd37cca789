//! Creative step: propose new ad concepts from validated insights.

use crate::agents::client::{strip_code_fence, AgentError, GeminiClient};
use crate::agents::prompts::{fill_prompt, CREATIVE_PROMPT};
use crate::analysis::{PeriodComparison, SegmentMetrics};
use crate::models::{CreativeSet, Insight};
use serde::Serialize;
use tracing::warn;

/// Higher temperature than the analytical steps; concept generation
/// benefits from variance.
const CREATIVE_TEMPERATURE: f32 = 0.9;

/// The performance slice handed to the creative prompt.
#[derive(Debug, Serialize)]
pub struct CreativeData<'a> {
    pub top_performers: &'a [SegmentMetrics],
    pub performance_summary: &'a PeriodComparison,
}

pub struct CreativeAgent<'a> {
    client: &'a GeminiClient,
}

impl<'a> CreativeAgent<'a> {
    pub fn new(client: &'a GeminiClient) -> Self {
        Self { client }
    }

    /// Generate creative concepts from validated insights.
    ///
    /// Never fails: any error yields an empty concept list with the default
    /// testing strategy and the error text attached.
    pub async fn generate_creatives(
        &self,
        insights: &[Insight],
        creative_data: &CreativeData<'_>,
    ) -> CreativeSet {
        match self.request_creatives(insights, creative_data).await {
            Ok(set) => set,
            Err(e) => {
                warn!("Creative generation failed, using fallback: {}", e);
                CreativeSet::fallback(e.to_string())
            }
        }
    }

    async fn request_creatives(
        &self,
        insights: &[Insight],
        creative_data: &CreativeData<'_>,
    ) -> Result<CreativeSet, AgentError> {
        let insights_json = serde_json::to_string_pretty(insights)?;
        let data_json = serde_json::to_string_pretty(creative_data)?;

        let prompt = fill_prompt(
            CREATIVE_PROMPT,
            &[
                ("insights", &insights_json),
                ("creative_data", &data_json),
            ],
        );

        let response = self
            .client
            .generate_with_temperature(&prompt, CREATIVE_TEMPERATURE)
            .await?;
        let set: CreativeSet = serde_json::from_str(strip_code_fence(&response))?;

        Ok(set)
    }
}
