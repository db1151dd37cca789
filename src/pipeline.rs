//! Pipeline orchestration.
//!
//! Runs the five steps in order (plan, analyze, insights, evaluate,
//! creatives) and records each one in the execution trace. Generative
//! steps degrade to fallbacks; only dataset problems abort the run.

use crate::agents::{
    ClientConfig, CreativeAgent, CreativeData, Evaluator, GeminiClient, InsightAgent,
    PlannerAgent,
};
use crate::analysis::{analyze, AnalysisResults};
use crate::config::Config;
use crate::dataset::AdRecord;
use crate::models::{CreativeSet, EvaluatedInsight, Insight, Plan};
use crate::trace::ExecutionTrace;
use std::time::Instant;
use tracing::info;

/// Everything one pipeline run produces.
pub struct PipelineOutput {
    pub plan: Plan,
    pub results: AnalysisResults,
    pub insights: Vec<EvaluatedInsight>,
    pub creatives: CreativeSet,
    pub trace: ExecutionTrace,
}

pub struct Pipeline {
    config: Config,
    client: GeminiClient,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let client = GeminiClient::new(ClientConfig {
            api_url: config.model.api_url.clone(),
            model_name: config.model.name.clone(),
            api_key: config.api_key(),
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
            timeout_seconds: config.model.timeout_seconds,
        });

        Self { config, client }
    }

    /// Run the full pipeline over an already-loaded dataset.
    pub async fn run(&self, query: &str, records: &[AdRecord]) -> PipelineOutput {
        let mut trace = ExecutionTrace::new(query, &self.config.model.name);

        println!("\n[PHASE 1/3] Planning & Data Analysis");
        let plan = self.plan_step(query, &mut trace).await;
        let results = self.analyze_step(records, &mut trace);

        println!("\n[PHASE 2/3] Insight Generation & Validation");
        let raw_insights = self.insight_step(&plan, &results, &mut trace).await;
        let insights = self.evaluate_step(&raw_insights, &mut trace);

        println!("\n[PHASE 3/3] Creative Recommendations");
        let creatives = self.creative_step(&insights, &results, &mut trace).await;

        PipelineOutput {
            plan,
            results,
            insights,
            creatives,
            trace,
        }
    }

    async fn plan_step(&self, query: &str, trace: &mut ExecutionTrace) -> Plan {
        let started = Instant::now();
        let plan = PlannerAgent::new(&self.client).create_plan(query).await;
        let elapsed = started.elapsed().as_secs_f64();

        info!("Plan created with {} steps in {:.2}s", plan.steps.len(), elapsed);
        trace.log_step("create_plan", "planner_agent", &query, &plan, elapsed);
        plan
    }

    fn analyze_step(
        &self,
        records: &[AdRecord],
        trace: &mut ExecutionTrace,
    ) -> AnalysisResults {
        let started = Instant::now();
        let results = analyze(
            records,
            self.config.data.window_days,
            self.config.data.top_n,
        );
        let elapsed = started.elapsed().as_secs_f64();

        info!(
            "Analyzed {} rows across {} campaigns in {:.2}s",
            results.summary.total_rows, results.summary.campaigns, elapsed
        );
        trace.log_step(
            "analyze_data",
            "data_agent",
            &records.len(),
            &results.summary,
            elapsed,
        );
        results
    }

    async fn insight_step(
        &self,
        plan: &Plan,
        results: &AnalysisResults,
        trace: &mut ExecutionTrace,
    ) -> Vec<Insight> {
        let started = Instant::now();
        let insights = InsightAgent::new(&self.client)
            .generate_insights(results, &plan.objective)
            .await;
        let elapsed = started.elapsed().as_secs_f64();

        info!("Generated {} insights in {:.2}s", insights.len(), elapsed);
        trace.log_step(
            "generate_insights",
            "insight_agent",
            &plan.objective,
            &insights,
            elapsed,
        );
        insights
    }

    fn evaluate_step(
        &self,
        insights: &[Insight],
        trace: &mut ExecutionTrace,
    ) -> Vec<EvaluatedInsight> {
        let started = Instant::now();
        let evaluated =
            Evaluator::new(self.config.evaluation.confidence_min).evaluate_all(insights);
        let elapsed = started.elapsed().as_secs_f64();

        let passed = evaluated.iter().filter(|i| i.passed).count();
        info!("{}/{} insights passed validation", passed, evaluated.len());
        trace.log_step(
            "evaluate_insights",
            "evaluator",
            &insights.len(),
            &evaluated,
            elapsed,
        );
        evaluated
    }

    async fn creative_step(
        &self,
        insights: &[EvaluatedInsight],
        results: &AnalysisResults,
        trace: &mut ExecutionTrace,
    ) -> CreativeSet {
        let started = Instant::now();
        let inputs = creative_inputs(insights);
        let creative_data = CreativeData {
            top_performers: &results.top_performers,
            performance_summary: &results.recent_trends,
        };

        let creatives = CreativeAgent::new(&self.client)
            .generate_creatives(&inputs, &creative_data)
            .await;
        let elapsed = started.elapsed().as_secs_f64();

        info!(
            "Generated {} creative concepts in {:.2}s",
            creatives.creative_concepts.len(),
            elapsed
        );
        trace.log_step(
            "generate_creatives",
            "creative_agent",
            &inputs.len(),
            &creatives,
            elapsed,
        );
        creatives
    }
}

/// Insights handed to the creative step: validated ones when any passed,
/// otherwise every non-fallback insight so the step still has material.
fn creative_inputs(insights: &[EvaluatedInsight]) -> Vec<Insight> {
    let validated: Vec<Insight> = insights
        .iter()
        .filter(|i| i.passed)
        .map(|i| i.insight.clone())
        .collect();

    if !validated.is_empty() {
        return validated;
    }

    insights
        .iter()
        .filter(|i| !i.insight.error)
        .map(|i| i.insight.clone())
        .collect()
}
