//! JSON snapshot persistence.

use std::path::Path;

use anyhow::{Context, Result};

use crate::memory::{InMemoryRegistry, Snapshot};

/// Save the registry's state as pretty-printed JSON.
pub fn save_snapshot(registry: &InMemoryRegistry, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&registry.snapshot())
        .context("failed to serialize snapshot")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
    Ok(())
}

/// Load a registry from a JSON snapshot file.
pub fn load_snapshot(path: &Path) -> Result<InMemoryRegistry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot from {}", path.display()))?;
    let snapshot: Snapshot =
        serde_json::from_str(&content).context("failed to parse snapshot JSON")?;
    Ok(InMemoryRegistry::from_snapshot(snapshot))
}
