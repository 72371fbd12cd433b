//! Offline signal catalog validation.

use std::path::Path;

use anyhow::Context;

/// Load and validate a catalog file, then print one line per pattern.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub(crate) fn run_catalog_check(path: &Path) -> anyhow::Result<()> {
    let catalog = leadscout_core::load_catalog(path)
        .with_context(|| format!("invalid signal catalog {}", path.display()))?;

    println!("{:<32}{:<10}NAME", "PATTERN", "SIGNALS");
    for pattern in &catalog.patterns {
        println!("{:<32}{:<10}{}", pattern.id, pattern.signals.len(), pattern.name);
    }
    println!(
        "\n{} patterns, {} signal definitions: ok",
        catalog.patterns.len(),
        catalog.signal_count()
    );
    Ok(())
}
