//! TOML scheme-configuration parser.
//!
//! Loads a course's evaluation scheme from a TOML file and validates it
//! by running the same planning logic the engine uses, so a file that
//! validates here will be accepted by `configure_scheme`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::scheme::{plan_configuration, SchemeEntry};

/// Intermediate TOML structure for scheme files.
#[derive(Debug, Deserialize)]
struct TomlSchemeFile {
    scheme: TomlSchemeHeader,
    #[serde(default)]
    entries: Vec<TomlSchemeEntry>,
}

#[derive(Debug, Deserialize)]
struct TomlSchemeHeader {
    /// Registrar course code the scheme applies to.
    course: String,
    #[serde(default)]
    #[allow(dead_code)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlSchemeEntry {
    label: String,
    weight: f64,
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    order: Option<u32>,
    #[serde(default = "default_true")]
    active: bool,
}

fn default_true() -> bool {
    true
}

/// A parsed scheme file: the course code it targets and the entries to
/// submit to `configure_scheme`.
#[derive(Debug, Clone)]
pub struct SchemeFile {
    pub course_code: String,
    pub entries: Vec<SchemeEntry>,
}

/// Parse a scheme TOML file. Shape errors surface here; semantic
/// validation (weight totals etc.) is a separate step, see
/// [`validate_scheme_file`].
pub fn parse_scheme_file(path: &Path) -> Result<SchemeFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scheme file {}", path.display()))?;
    let file: TomlSchemeFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse scheme file {}", path.display()))?;

    let entries = file
        .entries
        .iter()
        .enumerate()
        .map(|(index, e)| SchemeEntry {
            id: e.id,
            label: e.label.clone(),
            weight_percent: e.weight,
            display_order: e.order.unwrap_or(index as u32 + 1),
            active: e.active,
        })
        .collect();

    Ok(SchemeFile {
        course_code: file.scheme.course,
        entries,
    })
}

/// Parse and semantically validate a scheme file as a first-time
/// configuration. Returns the entry count on success.
pub fn validate_scheme_file(path: &Path) -> Result<usize> {
    let file = parse_scheme_file(path)?;
    plan_configuration(Uuid::nil(), &[], &file.entries)
        .with_context(|| format!("scheme file {} is invalid", path.display()))?;
    Ok(file.entries.len())
}
