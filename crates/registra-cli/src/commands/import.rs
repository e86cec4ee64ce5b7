//! The `registra import` command.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use uuid::Uuid;

use registra_core::ledger::ScoreSubmission;

use super::open_workspace;

#[derive(Deserialize)]
struct CsvRow {
    enrollment_id: Uuid,
    label: String,
    value: f64,
    weight: f64,
    notes: Option<String>,
}

pub async fn execute(data: &Path, csv_path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut by_enrollment: BTreeMap<Uuid, Vec<ScoreSubmission>> = BTreeMap::new();
    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        by_enrollment
            .entry(row.enrollment_id)
            .or_default()
            .push(ScoreSubmission {
                label: row.label,
                value: row.value,
                weight_percent: row.weight,
                notes: row.notes,
            });
    }

    let workspace = open_workspace(data)?;
    let mut recorded = 0usize;
    let mut rejected = 0usize;
    for (enrollment_id, submissions) in by_enrollment {
        let outcome = workspace.engine.record_batch(enrollment_id, submissions).await?;
        recorded += outcome.recorded.len();
        for rejection in &outcome.rejected {
            eprintln!(
                "  [{enrollment_id}] {} rejected: {}",
                rejection.label, rejection.error
            );
        }
        rejected += outcome.rejected.len();
    }
    workspace.save()?;

    println!(
        "Imported {recorded} scores from {} ({rejected} rejected).",
        csv_path.display()
    );
    Ok(())
}
