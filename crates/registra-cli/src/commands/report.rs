//! The `registra report` command.

use std::path::Path;

use anyhow::{bail, Result};

use registra_core::traits::Registry;
use registra_report::{build_period_report, render_markdown, save_json};

use super::open_workspace;

pub async fn execute(data: &Path, period: &str, output: &Path, format: &str) -> Result<()> {
    let workspace = open_workspace(data)?;
    let period = workspace.resolve_period(period).await?;
    let courses = workspace.store.courses().await?;
    let enrollments = workspace.store.enrollments_by_period(period.id).await?;
    let students = workspace.store.students().await?;

    let report = build_period_report(period, &courses, &enrollments, &students);
    match format {
        "markdown" => {
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(output, render_markdown(&report))?;
        }
        "json" => save_json(&report, output)?,
        other => bail!("unknown report format '{other}' (expected markdown or json)"),
    }

    println!(
        "Wrote {} report for {} to {}.",
        format,
        report.period.name,
        output.display()
    );
    Ok(())
}
