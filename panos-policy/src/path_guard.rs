use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse an output path that would overwrite one of `protected`.
pub fn ensure_output_not_protected(output: &Path, protected: &[&Path]) -> Result<()> {
    let out_norm = normalize_for_compare(output)
        .with_context(|| format!("failed to normalize output path {}", output.display()))?;

    for path in protected {
        let norm = normalize_for_compare(path)
            .with_context(|| format!("failed to normalize path {}", path.display()))?;
        if out_norm == norm {
            bail!(
                "refusing to overwrite {}: choose a different --output",
                path.display()
            );
        }
    }
    Ok(())
}

fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // Paths not on disk yet are only joined with the cwd; `..` is not resolved.
    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().context("current_dir")?
    };

    Ok(base.join(path))
}
