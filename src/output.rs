//! Answer checkpoint files.

use std::path::Path;

use anyhow::{Context, Result};

/// Write `text` to `path` as UTF-8, creating parent directories.
pub fn write_checkpoint(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write response file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote response checkpoint");
    Ok(())
}
