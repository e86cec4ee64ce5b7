//! The `registra seed` command.

use std::path::Path;

use anyhow::Result;

use registra_store::{persist, seed, InMemoryRegistry};

pub fn execute(data: &Path) -> Result<()> {
    let registry = InMemoryRegistry::from_snapshot(seed::demo_snapshot());
    persist::save_snapshot(&registry, data)?;

    let snapshot = registry.snapshot();
    println!(
        "Seeded {} with {} students, {} courses, {} periods, {} enrollments.",
        data.display(),
        snapshot.students.len(),
        snapshot.courses.len(),
        snapshot.periods.len(),
        snapshot.enrollments.len()
    );
    Ok(())
}
