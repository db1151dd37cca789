//! Grouped metric aggregation and derived ratios.
//!
//! All ratios are zero-safe: any division with a zero denominator
//! yields 0.0 rather than infinity or NaN.

use crate::dataset::AdRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Divide, returning 0.0 when the denominator is not positive.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to four decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Summed base metrics plus derived ratios for one group of rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub purchases: u64,
    pub revenue: f64,
    /// Click-through rate as a percentage.
    pub ctr: f64,
    /// Return on ad spend.
    pub roas: f64,
    /// Cost per click.
    pub cpc: f64,
    /// Cost per acquisition.
    pub cpa: f64,
}

impl Metrics {
    fn accumulate(&mut self, record: &AdRecord) {
        self.spend += record.spend;
        self.impressions += record.impressions;
        self.clicks += record.clicks;
        self.purchases += record.purchases;
        self.revenue += record.revenue;
    }

    fn finalize(&mut self) {
        self.ctr = round4(safe_div(self.clicks as f64, self.impressions as f64) * 100.0);
        self.roas = round2(safe_div(self.revenue, self.spend));
        self.cpc = round2(safe_div(self.spend, self.clicks as f64));
        self.cpa = round2(safe_div(self.spend, self.purchases as f64));
    }

    /// Sum a set of records into a finalized metrics block.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AdRecord>) -> Self {
        let mut metrics = Metrics::default();
        for record in records {
            metrics.accumulate(record);
        }
        metrics.finalize();
        metrics
    }
}

/// Metrics for one segment (group) of the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMetrics {
    /// Segment key, e.g. a campaign name or "campaign / adset".
    pub segment: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// Aggregate records into segments keyed by `key_fn`, sorted by segment name.
pub fn aggregate_by<F>(records: &[AdRecord], key_fn: F) -> Vec<SegmentMetrics>
where
    F: Fn(&AdRecord) -> String,
{
    let mut groups: BTreeMap<String, Metrics> = BTreeMap::new();

    for record in records {
        groups.entry(key_fn(record)).or_default().accumulate(record);
    }

    groups
        .into_iter()
        .map(|(segment, mut metrics)| {
            metrics.finalize();
            SegmentMetrics { segment, metrics }
        })
        .collect()
}

/// Top `n` segments by the selected metric, highest first.
pub fn top_n<F>(groups: &[SegmentMetrics], n: usize, select: F) -> Vec<SegmentMetrics>
where
    F: Fn(&Metrics) -> f64,
{
    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| {
        select(&b.metrics)
            .partial_cmp(&select(&a.metrics))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// Bottom `n` segments by the selected metric, lowest first.
///
/// Zero-valued segments are excluded so that groups with no spend or
/// no conversions do not dominate the worst-performer list.
pub fn bottom_n<F>(groups: &[SegmentMetrics], n: usize, select: F) -> Vec<SegmentMetrics>
where
    F: Fn(&Metrics) -> f64,
{
    let mut sorted: Vec<SegmentMetrics> = groups
        .iter()
        .filter(|g| select(&g.metrics) > 0.0)
        .cloned()
        .collect();
    sorted.sort_by(|a, b| {
        select(&a.metrics)
            .partial_cmp(&select(&b.metrics))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// Date span covered by the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

/// Overall summary of the loaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_rows: usize,
    pub date_range: DateRange,
    pub campaigns: usize,
    pub adsets: usize,
    pub creative_types: Vec<String>,
    pub platforms: Vec<String>,
    pub countries: Vec<String>,
    pub total_spend: f64,
    pub total_revenue: f64,
    pub overall_roas: f64,
}

/// Build the overall data summary. Records must be non-empty and date-sorted.
pub fn data_summary(records: &[AdRecord]) -> DataSummary {
    let start = records.first().map(|r| r.date).unwrap_or_default();
    let end = records.last().map(|r| r.date).unwrap_or_default();

    let mut campaigns: Vec<&str> = records.iter().map(|r| r.campaign_name.as_str()).collect();
    campaigns.sort_unstable();
    campaigns.dedup();

    let mut adsets: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.campaign_name.as_str(), r.adset_name.as_str()))
        .collect();
    adsets.sort_unstable();
    adsets.dedup();

    let total_spend: f64 = records.iter().map(|r| r.spend).sum();
    let total_revenue: f64 = records.iter().map(|r| r.revenue).sum();

    DataSummary {
        total_rows: records.len(),
        date_range: DateRange {
            start,
            end,
            days: (end - start).num_days(),
        },
        campaigns: campaigns.len(),
        adsets: adsets.len(),
        creative_types: distinct(records, |r| &r.creative_type),
        platforms: distinct(records, |r| &r.platform),
        countries: distinct(records, |r| &r.country),
        total_spend: round2(total_spend),
        total_revenue: round2(total_revenue),
        overall_roas: round2(safe_div(total_revenue, total_spend)),
    }
}

fn distinct<F>(records: &[AdRecord], field: F) -> Vec<String>
where
    F: Fn(&AdRecord) -> &String,
{
    let mut values: Vec<String> = records.iter().map(|r| field(r).clone()).collect();
    values.sort_unstable();
    values.dedup();
    values
}
