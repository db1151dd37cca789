//! Time-based analysis: daily series, rolling trends, period comparison.

use crate::analysis::metrics::{round2, round4, safe_div};
use crate::dataset::AdRecord;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-day sums with zero-safe daily ratios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub spend: f64,
    pub revenue: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub purchases: u64,
    pub roas: f64,
    pub ctr: f64,
}

/// Direction of a rolling-window trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Rolling-trend output for the daily series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingTrends {
    pub window: usize,
    pub daily_trends: Vec<DailyMetrics>,
    pub roas_trend_direction: TrendDirection,
    pub ctr_trend_direction: TrendDirection,
}

/// Metrics for one comparison period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub spend: f64,
    pub revenue: f64,
    pub roas: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub purchases: u64,
    pub ctr: f64,
}

impl PeriodMetrics {
    fn from_records<'a>(records: impl IntoIterator<Item = &'a AdRecord>) -> Self {
        let mut period = PeriodMetrics::default();
        for r in records {
            period.spend += r.spend;
            period.revenue += r.revenue;
            period.impressions += r.impressions;
            period.clicks += r.clicks;
            period.purchases += r.purchases;
        }
        period.roas = safe_div(period.revenue, period.spend);
        period.ctr = safe_div(period.clicks as f64, period.impressions as f64) * 100.0;
        period
    }
}

/// Percentage change per metric; 0.0 whenever the baseline is 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodChanges {
    pub spend_change_pct: f64,
    pub revenue_change_pct: f64,
    pub roas_change_pct: f64,
    pub impressions_change_pct: f64,
    pub clicks_change_pct: f64,
    pub purchases_change_pct: f64,
    pub ctr_change_pct: f64,
}

/// Current-vs-previous period comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current_period: PeriodMetrics,
    pub previous_period: PeriodMetrics,
    pub changes: PeriodChanges,
}

/// Collapse records into a date-sorted daily series.
pub fn daily_series(records: &[AdRecord]) -> Vec<DailyMetrics> {
    let mut days: BTreeMap<NaiveDate, DailyMetrics> = BTreeMap::new();

    for r in records {
        let entry = days.entry(r.date).or_insert_with(|| DailyMetrics {
            date: r.date,
            spend: 0.0,
            revenue: 0.0,
            impressions: 0,
            clicks: 0,
            purchases: 0,
            roas: 0.0,
            ctr: 0.0,
        });
        entry.spend += r.spend;
        entry.revenue += r.revenue;
        entry.impressions += r.impressions;
        entry.clicks += r.clicks;
        entry.purchases += r.purchases;
    }

    days.into_values()
        .map(|mut day| {
            day.roas = safe_div(day.revenue, day.spend);
            day.ctr = safe_div(day.clicks as f64, day.impressions as f64) * 100.0;
            day
        })
        .collect()
}

/// Rolling mean over `values`; the first `window - 1` positions are None.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || values.len() < window {
        return vec![None; values.len()];
    }

    let mut result = vec![None; values.len()];
    let mut sum: f64 = values[..window].iter().sum();
    result[window - 1] = Some(sum / window as f64);

    for i in window..values.len() {
        sum += values[i] - values[i - window];
        result[i] = Some(sum / window as f64);
    }

    result
}

/// Direction of the latest rolling value relative to one window-length back.
fn trend_direction(rolling: &[Option<f64>], window: usize) -> TrendDirection {
    if rolling.len() < window {
        return TrendDirection::InsufficientData;
    }
    if rolling.len() == window {
        // No older rolling point to compare against.
        return TrendDirection::Stable;
    }

    let recent = rolling.last().copied().flatten();
    let older = rolling[rolling.len() - window];

    match (recent, older) {
        (Some(recent), Some(older)) if recent > older => TrendDirection::Increasing,
        (Some(recent), Some(older)) if recent < older => TrendDirection::Decreasing,
        _ => TrendDirection::Stable,
    }
}

/// Compute rolling ROAS and CTR trends over the daily series.
pub fn rolling_trends(records: &[AdRecord], window: usize) -> RollingTrends {
    let daily = daily_series(records);

    let (roas_dir, ctr_dir) = if daily.len() < window {
        (
            TrendDirection::InsufficientData,
            TrendDirection::InsufficientData,
        )
    } else {
        let roas_values: Vec<f64> = daily.iter().map(|d| d.roas).collect();
        let ctr_values: Vec<f64> = daily.iter().map(|d| d.ctr).collect();

        (
            trend_direction(&rolling_mean(&roas_values, window), window),
            trend_direction(&rolling_mean(&ctr_values, window), window),
        )
    };

    RollingTrends {
        window,
        daily_trends: daily,
        roas_trend_direction: roas_dir,
        ctr_trend_direction: ctr_dir,
    }
}

/// Compare the last `days` days against the preceding `days`-day window.
///
/// Current period is rows strictly newer than `end - days`; previous period is
/// the window before that (exclusive lower bound, inclusive upper bound).
pub fn compare_periods(records: &[AdRecord], days: i64) -> PeriodComparison {
    let end = records.iter().map(|r| r.date).max().unwrap_or_default();
    let current_start = end - Duration::days(days);
    let previous_start = current_start - Duration::days(days);

    let current =
        PeriodMetrics::from_records(records.iter().filter(|r| r.date > current_start));
    let previous = PeriodMetrics::from_records(
        records
            .iter()
            .filter(|r| r.date > previous_start && r.date <= current_start),
    );

    let changes = PeriodChanges {
        spend_change_pct: pct_change(current.spend, previous.spend),
        revenue_change_pct: pct_change(current.revenue, previous.revenue),
        roas_change_pct: pct_change(current.roas, previous.roas),
        impressions_change_pct: pct_change(
            current.impressions as f64,
            previous.impressions as f64,
        ),
        clicks_change_pct: pct_change(current.clicks as f64, previous.clicks as f64),
        purchases_change_pct: pct_change(current.purchases as f64, previous.purchases as f64),
        ctr_change_pct: pct_change(current.ctr, previous.ctr),
    };

    PeriodComparison {
        current_period: current,
        previous_period: previous,
        changes,
    }
}

fn pct_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        round2((current - previous) / previous * 100.0)
    } else {
        0.0
    }
}

/// The comparison rows rendered in the Markdown report, in display order.
pub fn comparison_rows(comparison: &PeriodComparison) -> Vec<(&'static str, f64, f64, f64)> {
    let cur = &comparison.current_period;
    let prev = &comparison.previous_period;
    let chg = &comparison.changes;
    vec![
        ("ROAS", round2(cur.roas), round2(prev.roas), chg.roas_change_pct),
        ("Revenue", round2(cur.revenue), round2(prev.revenue), chg.revenue_change_pct),
        ("Spend", round2(cur.spend), round2(prev.spend), chg.spend_change_pct),
        ("CTR", round4(cur.ctr), round4(prev.ctr), chg.ctr_change_pct),
        (
            "Purchases",
            cur.purchases as f64,
            prev.purchases as f64,
            chg.purchases_change_pct,
        ),
    ]
}
