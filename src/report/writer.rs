use std::path::PathBuf;

use crate::{daemon::storage::error::StoreError, utils::time::date_to_record_name};

use super::DailyReport;

/// Persists report snapshots, one JSON file per date. Snapshots are derived artifacts and get
/// regenerated in place, unlike the entry log they describe.
pub struct ReportWriter {
    report_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(report_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&report_dir)?;

        Ok(Self { report_dir })
    }

    pub async fn write_snapshot(&self, report: &DailyReport) -> Result<PathBuf, StoreError> {
        let path = self
            .report_dir
            .join(format!("{}.json", date_to_record_name(report.date)));
        let data = serde_json::to_vec_pretty(report)?;
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        daemon::storage::error::StoreError,
        report::{CategoryShare, DailyReport},
        utils::percentage::count_percentage,
    };

    use super::ReportWriter;

    #[tokio::test]
    async fn test_snapshot_roundtrip_path_and_content() -> Result<(), StoreError> {
        let dir = tempdir()?;
        let writer = ReportWriter::new(dir.path().to_owned())?;

        let report = DailyReport {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            shares: vec![CategoryShare {
                category: crate::daemon::storage::category::Category::Working,
                count: 4,
                percentage: count_percentage(4, 4),
            }],
            total_minutes: 60,
        };

        let path = writer.write_snapshot(&report).await?;
        assert_eq!(path.file_name().unwrap(), "2024-01-01.json");

        let raw = std::fs::read_to_string(&path)?;
        let value = serde_json::from_str::<serde_json::Value>(&raw)?;
        assert_eq!(value["date"], "2024-01-01");
        assert_eq!(value["total_minutes"], 60);
        assert_eq!(value["shares"][0]["category"], "Working");
        assert_eq!(value["shares"][0]["percentage"], 100.0);
        Ok(())
    }
}
