//! File-system primitives used by execution and undo. None of them overwrite.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Moves `from` to `to`, falling back to copy-then-delete when a plain rename fails
/// (for example across devices).
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        bail!("target already exists: {}", to.display());
    }
    if let Err(rename_err) = fs::rename(from, to) {
        if !from.is_file() {
            return Err(rename_err).with_context(|| format!("renaming {}", from.display()));
        }
        fs::copy(from, to).with_context(|| {
            format!("moving {} to {} ({rename_err})", from.display(), to.display())
        })?;
        if let Err(e) = fs::remove_file(from) {
            let _ = fs::remove_file(to);
            return Err(e).with_context(|| format!("removing {}", from.display()));
        }
    }
    Ok(())
}

pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        bail!("target already exists: {}", to.display());
    }
    fs::copy(from, to)
        .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
    Ok(())
}

pub fn remove_file(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("file no longer exists: {}", path.display());
    }
    fs::remove_file(path).with_context(|| format!("removing {}", path.display()))
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_and_copy_refuse_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        assert!(move_file(&a, &b).is_err());
        assert!(copy_file(&a, &b).is_err());
        assert_eq!(fs::read(&b).unwrap(), b"b");

        let c = dir.path().join("c.pdf");
        move_file(&a, &c).unwrap();
        assert!(!a.exists());
        copy_file(&c, &a).unwrap();
        assert!(a.exists() && c.exists());
    }

    #[test]
    fn removing_a_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_file(&dir.path().join("gone.pdf")).is_err());
    }
}
