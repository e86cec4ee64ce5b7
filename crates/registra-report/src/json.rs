//! JSON persistence for period reports.

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::PeriodReport;

/// Save the report as pretty-printed JSON.
pub fn save_json(report: &PeriodReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_period_report;
    use chrono::NaiveDate;
    use registra_core::model::{AcademicPeriod, PeriodState};
    use uuid::Uuid;

    #[test]
    fn save_writes_parseable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("2025-ii.json");
        let period = AcademicPeriod {
            id: Uuid::new_v4(),
            name: "2025-II".into(),
            year: 2025,
            cycle_label: "II".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 19).unwrap(),
            state: PeriodState::Closed,
        };
        let report = build_period_report(period, &[], &[], &[]);
        save_json(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: PeriodReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.period.name, "2025-II");
    }
}
