use crate::fs_apply;
use anyhow::Result;
use renamer_core::{FileEntry, FileStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use storage::{Operation, OperationKind, RenameTransaction, TransactionLog};
use tracing::{info, warn};

/// Runs rename/copy batches and their undo. Both take the same in-process lock, so an
/// undo never overlaps an execution.
pub struct Executor {
    pub(crate) log: TransactionLog,
    guard: Mutex<()>,
}

#[derive(Debug, Default, Serialize)]
pub struct ExecutionReport {
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub log_path: Option<PathBuf>,
}

impl Executor {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log: TransactionLog::new(log_dir),
            guard: Mutex::new(()),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Renames entries in place, or copies them into `dest` when one is given.
    ///
    /// Entries in the error state are skipped, as are in-place renames that would not change
    /// the name. A target that already exists fails that entry only. The successful
    /// operations are saved as one transaction log.
    pub fn execute(&self, entries: &mut [FileEntry], dest: Option<&Path>) -> Result<ExecutionReport> {
        let _lock = self.lock();
        if let Some(dir) = dest {
            fs_apply::ensure_dir(dir)?;
        }
        let kind = if dest.is_some() {
            OperationKind::Copy
        } else {
            OperationKind::Rename
        };

        let mut report = ExecutionReport::default();
        let mut operations = Vec::new();
        for entry in entries.iter_mut() {
            if entry.status == FileStatus::Error || entry.status == FileStatus::Renamed {
                report.skipped += 1;
                continue;
            }
            if entry.proposed_name.is_empty() {
                entry.mark_error("no proposed name");
                report.failed += 1;
                continue;
            }
            let target = entry.target_dir(dest).join(entry.proposed_file_name());
            if kind == OperationKind::Rename && target == entry.original_path {
                report.skipped += 1;
                continue;
            }

            let outcome = match kind {
                OperationKind::Copy => fs_apply::copy_file(&entry.original_path, &target),
                OperationKind::Rename => fs_apply::move_file(&entry.original_path, &target),
            };
            match outcome {
                Ok(()) => {
                    operations.push(Operation {
                        kind,
                        old_path: entry.original_path.clone(),
                        new_path: target.clone(),
                    });
                    if kind == OperationKind::Rename {
                        entry.original_path = target;
                        entry.original_name = entry.proposed_name.clone();
                    }
                    entry.status = FileStatus::Renamed;
                    entry.error_message.clear();
                    report.renamed += 1;
                }
                Err(e) => {
                    warn!(path = %entry.original_path.display(), error = %e, "rename failed");
                    entry.mark_error(format!("{e:#}"));
                    report.failed += 1;
                }
            }
        }

        if !operations.is_empty() {
            report.log_path = Some(self.log.save(&RenameTransaction::new(operations))?);
        }
        info!(
            renamed = report.renamed,
            skipped = report.skipped,
            failed = report.failed,
            "execution finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn entry(path: PathBuf, name: &str) -> FileEntry {
        let mut e = FileEntry::new(path);
        e.proposed_name = name.to_string();
        e
    }

    #[test]
    fn rename_updates_entry_and_writes_log() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("scan.pdf");
        fs::write(&src, b"x").unwrap();
        let exec = Executor::new(dir.path().join("logs"));

        let mut entries = vec![entry(src.clone(), "2024_07_국어")];
        let report = exec.execute(&mut entries, None).unwrap();
        assert_eq!(report.renamed, 1);
        let renamed = dir.path().join("2024_07_국어.pdf");
        assert!(renamed.exists() && !src.exists());
        assert_eq!(entries[0].original_path, renamed);
        assert_eq!(entries[0].status, FileStatus::Renamed);

        let tx = exec.log.load(&report.log_path.unwrap()).unwrap();
        assert_eq!(tx.operations.len(), 1);
        assert_eq!(tx.operations[0].kind, OperationKind::Rename);
        assert_eq!(tx.operations[0].old_path, src);
    }

    #[test]
    fn skips_errors_and_unchanged_names_and_logs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let same = dir.path().join("same.pdf");
        fs::write(&same, b"x").unwrap();
        let exec = Executor::new(dir.path().join("logs"));

        let mut broken = entry(dir.path().join("broken.pdf"), "other");
        broken.mark_error("unreadable");
        let mut entries = vec![entry(same.clone(), "same"), broken];
        let report = exec.execute(&mut entries, None).unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.renamed, 0);
        assert!(report.log_path.is_none());
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn existing_target_fails_only_that_entry() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();
        fs::write(dir.path().join("taken.pdf"), b"t").unwrap();
        let exec = Executor::new(dir.path().join("logs"));

        let mut entries = vec![entry(a.clone(), "taken"), entry(b, "free")];
        let report = exec.execute(&mut entries, None).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.renamed, 1);
        assert_eq!(entries[0].status, FileStatus::Error);
        assert!(entries[0].error_message.contains("already exists"));
        assert!(a.exists());
        assert_eq!(fs::read(dir.path().join("taken.pdf")).unwrap(), b"t");
    }

    #[test]
    fn copy_mode_creates_destination_and_keeps_originals() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("scan.hwp");
        fs::write(&src, b"x").unwrap();
        let dest = dir.path().join("out/sorted");
        let exec = Executor::new(dir.path().join("logs"));

        let mut entries = vec![entry(src.clone(), "회의록")];
        exec.execute(&mut entries, Some(&dest)).unwrap();
        assert!(src.exists());
        assert!(dest.join("회의록.hwp").exists());
        assert_eq!(entries[0].original_path, src);
        assert_eq!(entries[0].status, FileStatus::Renamed);
    }
}
