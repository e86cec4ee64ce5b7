//! The `registra record` and `registra record-part` commands.

use std::path::Path;

use anyhow::Result;
use uuid::Uuid;

use registra_core::ledger::ScoreSubmission;

use super::open_workspace;

pub async fn execute(
    data: &Path,
    enrollment: Uuid,
    label: String,
    value: f64,
    weight: f64,
    notes: Option<String>,
) -> Result<()> {
    let workspace = open_workspace(data)?;
    let entry = workspace
        .engine
        .record_score(
            enrollment,
            ScoreSubmission {
                label,
                value,
                weight_percent: weight,
                notes,
            },
        )
        .await?;
    workspace.save()?;

    println!(
        "Recorded {} = {} ({}%) for enrollment {enrollment}.",
        entry.label, entry.value, entry.weight_percent
    );
    Ok(())
}

pub async fn execute_part(
    data: &Path,
    enrollment: Uuid,
    label: &str,
    part: u32,
    of: u32,
    value: f64,
) -> Result<()> {
    let workspace = open_workspace(data)?;
    let aggregate = workspace
        .engine
        .record_part_score(enrollment, label, part, of, value)
        .await?;
    workspace.save()?;

    match aggregate {
        Some(entry) => println!(
            "All {of} parts of {} recorded; aggregate grade {:.2}.",
            entry.label, entry.value
        ),
        None => println!("Recorded part {part}/{of} of {label}."),
    }
    Ok(())
}
