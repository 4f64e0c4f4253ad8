//! Collects candidate files from user-supplied files and folders.

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::models::FileEntry;

pub struct Scanner {
    extensions: Vec<String>,
    excludes: GlobSet,
    recursive: bool,
}

impl Scanner {
    pub fn new(config: &ScanConfig) -> anyhow::Result<Self> {
        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            excludes: build_globset(&config.exclude)?,
            recursive: config.recursive,
        })
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|s| s.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    /// Expands `inputs` into entries. Folders contribute their supported files sorted by
    /// name; explicit files are kept in the order given. Each path appears once.
    pub fn scan(&self, inputs: &[PathBuf]) -> anyhow::Result<Vec<FileEntry>> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for input in inputs {
            if input.is_dir() {
                for path in self.walk(input)? {
                    if seen.insert(path.clone()) {
                        entries.push(FileEntry::new(path));
                    }
                }
            } else if input.is_file() {
                if self.is_supported(input) && !self.excludes.is_match(input) {
                    if seen.insert(input.clone()) {
                        entries.push(FileEntry::new(input.clone()));
                    }
                } else {
                    debug!(path = %input.display(), "unsupported or excluded file skipped");
                }
            } else {
                warn!(path = %input.display(), "path does not exist");
            }
        }
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.order = i;
        }
        Ok(entries)
    }

    fn walk(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut walker = WalkDir::new(root).sort_by_file_name();
        if !self.recursive {
            walker = walker.max_depth(1);
        }
        let mut found = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || should_descend(e.path(), &self.excludes))
        {
            let entry = entry.with_context(|| format!("walking {}", root.display()))?;
            let path = entry.path();
            if entry.file_type().is_file() && self.is_supported(path) {
                found.push(path.to_path_buf());
            }
        }
        Ok(found)
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).with_context(|| format!("invalid exclude glob {pat:?}"))?);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, excludes: &GlobSet) -> bool {
    !is_hidden(path) && !excludes.is_match(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn folder_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.pdf"));
        touch(&root.join("a.HWP"));
        touch(&root.join("notes.txt"));
        touch(&root.join(".hidden.pdf"));
        touch(&root.join("sub/c.hwpx"));

        let scanner = Scanner::new(&ScanConfig::default()).unwrap();
        let entries = scanner.scan(&[root.to_path_buf()]).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.original_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(entries[1].order, 1);

        let recursive = Scanner::new(&ScanConfig {
            recursive: true,
            ..ScanConfig::default()
        })
        .unwrap();
        assert_eq!(recursive.scan(&[root.to_path_buf()]).unwrap().len(), 3);
    }

    #[test]
    fn excludes_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let keep = dir.path().join("keep.pdf");
        let drop = dir.path().join("draft_old.pdf");
        touch(&keep);
        touch(&drop);

        let scanner = Scanner::new(&ScanConfig {
            exclude: vec!["**/draft_*".into()],
            ..ScanConfig::default()
        })
        .unwrap();
        let entries = scanner
            .scan(&[keep.clone(), dir.path().to_path_buf(), drop])
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].original_path, keep);
    }

    #[test]
    fn bad_glob_is_reported() {
        let cfg = ScanConfig {
            exclude: vec!["[".into()],
            ..ScanConfig::default()
        };
        assert!(Scanner::new(&cfg).is_err());
    }
}
