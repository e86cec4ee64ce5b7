//! The `registra validate` command.

use std::path::Path;

use anyhow::Result;

use registra_core::parser;

pub fn execute(scheme: &Path) -> Result<()> {
    let entries = parser::validate_scheme_file(scheme)?;
    println!("{} is valid ({entries} entries).", scheme.display());
    Ok(())
}
