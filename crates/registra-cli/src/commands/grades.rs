//! The `registra grades` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};
use uuid::Uuid;

use registra_core::traits::Registry;

use super::open_workspace;

pub async fn execute(data: &Path, enrollment: Uuid) -> Result<()> {
    let workspace = open_workspace(data)?;
    let mut entries = workspace.store.grade_entries(enrollment).await?;
    entries.sort_by(|a, b| a.label.cmp(&b.label));
    let summary = workspace.engine.grade_summary(enrollment).await?;

    let mut table = Table::new();
    table.set_header(vec!["Label", "Value", "Weight", "Recorded"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(&entry.label),
            Cell::new(format!("{:.2}", entry.value)),
            Cell::new(format!("{:.1}%", entry.weight_percent)),
            Cell::new(entry.recorded_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    println!("{table}");

    println!(
        "Weighted sum: {:.2} | Rounded: {} | Complete: {} | Passes: {}",
        summary.weighted_sum,
        summary
            .rounded
            .map(|g| g.to_string())
            .unwrap_or_else(|| "-".into()),
        if summary.complete { "yes" } else { "no" },
        if summary.passes_rounded { "yes" } else { "no" }
    );
    Ok(())
}
