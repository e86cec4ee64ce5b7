//! The `registra open-period` and `registra close-period` commands.

use std::path::Path;

use anyhow::Result;

use registra_core::error::EngineError;
use registra_core::period::ClosePolicy;

use super::open_workspace;

pub async fn open(data: &Path, period: &str) -> Result<()> {
    let workspace = open_workspace(data)?;
    let period = workspace.resolve_period(period).await?;

    let summary = workspace.engine.open_period(period.id).await?;
    workspace.save()?;

    println!(
        "Opened {}; promoted {} students.",
        summary.period_name, summary.promoted
    );
    if let Some(forced) = summary.forced_closed {
        println!("Force-closed previously active period {forced}.");
    }
    Ok(())
}

pub async fn close(data: &Path, period: &str, force: bool) -> Result<()> {
    let workspace = open_workspace(data)?;
    let period = workspace.resolve_period(period).await?;
    let policy = if force {
        ClosePolicy::AcceptIncomplete
    } else {
        ClosePolicy::RequireComplete
    };

    let summary = match workspace.engine.close_period(period.id, policy).await {
        Ok(summary) => summary,
        Err(EngineError::IncompleteGrading(offenders)) => {
            eprintln!("Cannot close {}: incomplete ledgers.", period.name);
            for offender in &offenders {
                eprintln!(
                    "  enrollment {} missing: {}",
                    offender.enrollment_id,
                    offender.missing_labels.join(", ")
                );
            }
            eprintln!("Re-run with --force to freeze incomplete ledgers anyway.");
            return Err(EngineError::IncompleteGrading(offenders).into());
        }
        Err(e) => return Err(e.into()),
    };
    workspace.save()?;

    println!(
        "Closed {}: {} enrollments, {} graded, {} passed, {} failed, {} withdrawn.",
        summary.period_name,
        summary.enrollments,
        summary.graded,
        summary.passed_rounded,
        summary.failed_rounded,
        summary.withdrawn
    );
    Ok(())
}
