//! LLM agent modules for the analysis pipeline.
//!
//! Three generative steps (planner, insight, creative) share one Gemini
//! client; the evaluator is heuristic-only.

pub mod client;
pub mod creative;
pub mod evaluator;
pub mod insight;
pub mod planner;
pub mod prompts;

pub use client::{ClientConfig, GeminiClient};
pub use creative::{CreativeAgent, CreativeData};
pub use evaluator::Evaluator;
pub use insight::InsightAgent;
pub use planner::PlannerAgent;
