//! The `registra configure` command.

use std::path::Path;

use anyhow::Result;

use registra_core::parser;

use super::open_workspace;

pub async fn execute(data: &Path, scheme: &Path) -> Result<()> {
    let file = parser::parse_scheme_file(scheme)?;
    let workspace = open_workspace(data)?;
    let course = workspace.resolve_course(&file.course_code).await?;

    let stats = workspace
        .engine
        .configure_scheme(course.id, file.entries)
        .await?;
    workspace.save()?;

    println!(
        "Scheme applied to {}: {} created, {} updated, {} removed.",
        course.code, stats.created, stats.updated, stats.removed
    );
    if stats.migrated_entries > 0 {
        println!("Migrated {} historical entries.", stats.migrated_entries);
    }
    if stats.purged_entries > 0 {
        println!(
            "Purged {} entries of removed evaluation types.",
            stats.purged_entries
        );
    }
    Ok(())
}
