//! The aggregation-and-comparison engine.
//!
//! Runs every analysis level over the in-memory dataset and assembles
//! the results passed to the insight and creative steps.

pub mod metrics;
pub mod trends;

pub use metrics::{
    aggregate_by, bottom_n, data_summary, safe_div, top_n, DataSummary, Metrics, SegmentMetrics,
};
pub use trends::{
    compare_periods, rolling_trends, PeriodComparison, RollingTrends, TrendDirection,
};

use crate::dataset::AdRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Segment performance with top and bottom performers for one dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    pub performance: Vec<SegmentMetrics>,
    pub top: Vec<SegmentMetrics>,
    pub bottom: Vec<SegmentMetrics>,
}

impl SegmentAnalysis {
    fn by_roas(performance: Vec<SegmentMetrics>, n: usize) -> Self {
        let top = top_n(&performance, n, |m| m.roas);
        let bottom = bottom_n(&performance, n, |m| m.roas);
        Self {
            performance,
            top,
            bottom,
        }
    }
}

/// Creative-dimension analysis: formats plus best messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeAnalysis {
    pub type_performance: Vec<SegmentMetrics>,
    pub top_messages: Vec<SegmentMetrics>,
}

/// Everything the data step produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub summary: DataSummary,
    pub recent_trends: PeriodComparison,
    pub campaign_level: SegmentAnalysis,
    pub adset_level: SegmentAnalysis,
    pub audience_level: SegmentAnalysis,
    pub creative_level: CreativeAnalysis,
    pub geo_level: SegmentAnalysis,
    pub rolling_trends: RollingTrends,
    /// Creative-type segments ranked by ROAS, used by the creative step
    /// and the report's performance matrix.
    pub top_performers: Vec<SegmentMetrics>,
}

/// Run the full multi-level analysis.
///
/// `window` drives both the rolling trend and the period comparison;
/// `top_n` bounds the top/bottom performer lists.
pub fn analyze(records: &[AdRecord], window: usize, top: usize) -> AnalysisResults {
    debug!(
        "Analyzing {} rows (window={}, top_n={})",
        records.len(),
        window,
        top
    );

    let campaign = aggregate_by(records, |r| r.campaign_name.clone());
    let adset = aggregate_by(records, |r| {
        format!("{} / {}", r.campaign_name, r.adset_name)
    });
    let audience = aggregate_by(records, |r| r.audience_type.clone());
    let creative_type = aggregate_by(records, |r| r.creative_type.clone());
    let creative_message = aggregate_by(records, |r| r.creative_message.clone());
    let country = aggregate_by(records, |r| r.country.clone());

    let top_performers = top_n(&creative_type, top, |m| m.roas);

    AnalysisResults {
        summary: data_summary(records),
        recent_trends: compare_periods(records, window as i64),
        campaign_level: SegmentAnalysis::by_roas(campaign, top),
        adset_level: SegmentAnalysis::by_roas(adset, top),
        audience_level: SegmentAnalysis::by_roas(audience, top),
        creative_level: CreativeAnalysis {
            top_messages: top_n(&creative_message, top, |m| m.roas),
            type_performance: creative_type,
        },
        geo_level: SegmentAnalysis::by_roas(country, top),
        rolling_trends: rolling_trends(records, window),
        top_performers,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::dataset::AdRecord;
    use chrono::NaiveDate;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Build a record with the fields the aggregation tests care about.
    pub fn record(
        day: &str,
        campaign: &str,
        spend: f64,
        impressions: u64,
        clicks: u64,
        purchases: u64,
        revenue: f64,
    ) -> AdRecord {
        AdRecord {
            date: date(day),
            campaign_name: campaign.to_string(),
            adset_name: format!("{}-adset", campaign),
            creative_type: "Video".to_string(),
            creative_message: "Comfort first".to_string(),
            platform: "Facebook".to_string(),
            country: "US".to_string(),
            audience_type: "Lookalike".to_string(),
            spend,
            impressions,
            clicks,
            purchases,
            revenue,
        }
    }
}
