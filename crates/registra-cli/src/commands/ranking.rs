//! The `registra ranking` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use registra_core::ranking::rank_standings;
use registra_core::traits::Registry;

use super::open_workspace;

pub async fn execute(data: &Path, period: &str) -> Result<()> {
    let workspace = open_workspace(data)?;
    let period = workspace.resolve_period(period).await?;
    let enrollments = workspace.store.enrollments_by_period(period.id).await?;
    let students = workspace.store.students().await?;

    let standings = rank_standings(&enrollments, &students);
    if standings.is_empty() {
        println!("No frozen grades to rank in {}.", period.name);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Rank", "Student", "Average", "Graded Courses"]);
    for standing in &standings {
        table.add_row(vec![
            Cell::new(standing.rank),
            Cell::new(&standing.student_name),
            Cell::new(format!("{:.2}", standing.average)),
            Cell::new(standing.graded_courses),
        ]);
    }
    println!("Merit ranking — {}", period.name);
    println!("{table}");
    Ok(())
}
