//! Dataset loading.
//!
//! Loads the ad-performance CSV into memory and validates it before
//! the analysis engine touches it.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// A single row of the ad-performance dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdRecord {
    pub date: NaiveDate,
    pub campaign_name: String,
    pub adset_name: String,
    pub creative_type: String,
    pub creative_message: String,
    pub platform: String,
    pub country: String,
    pub audience_type: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub purchases: u64,
    pub revenue: f64,
}

/// Load the ads dataset from a CSV file.
///
/// Rows are returned sorted by date. Negative spend or revenue is rejected;
/// the aggregation engine assumes non-negative inputs.
pub fn load_ads_data(path: &Path) -> Result<Vec<AdRecord>> {
    info!("Loading dataset: {}", path.display());

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let mut records: Vec<AdRecord> = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let record: AdRecord =
            row.with_context(|| format!("Failed to parse dataset row {}", i + 2))?;

        if record.spend < 0.0 || record.revenue < 0.0 {
            bail!(
                "Dataset row {} has negative spend or revenue ({} / {})",
                i + 2,
                record.spend,
                record.revenue
            );
        }

        records.push(record);
    }

    if records.is_empty() {
        bail!("Dataset is empty: {}", path.display());
    }

    records.sort_by_key(|r| r.date);
    debug!("Loaded {} rows", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "date,campaign_name,adset_name,creative_type,creative_message,platform,country,audience_type,spend,impressions,clicks,purchases,revenue";

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_sorts_by_date() {
        let file = write_csv(&[
            "2024-03-02,Summer,AS1,Video,Comfort,Facebook,US,Lookalike,100.0,1000,50,5,500.0",
            "2024-03-01,Summer,AS1,Video,Comfort,Facebook,US,Lookalike,80.0,900,40,4,400.0",
        ]);

        let records = load_ads_data(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].date < records[1].date);
        assert_eq!(records[0].spend, 80.0);
    }

    #[test]
    fn test_load_rejects_negative_spend() {
        let file = write_csv(&[
            "2024-03-01,Summer,AS1,Video,Comfort,Facebook,US,Lookalike,-5.0,1000,50,5,500.0",
        ]);

        assert!(load_ads_data(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_empty_dataset() {
        let file = write_csv(&[]);
        assert!(load_ads_data(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_bad_date() {
        let file = write_csv(&[
            "not-a-date,Summer,AS1,Video,Comfort,Facebook,US,Lookalike,10.0,1000,50,5,500.0",
        ]);
        assert!(load_ads_data(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_ads_data(Path::new("/nonexistent/ads.csv")).is_err());
    }
}
