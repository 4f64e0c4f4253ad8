use crate::apply::Executor;
use crate::fs_apply;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use storage::{Operation, OperationKind};
use tracing::{info, warn};

#[derive(Debug, Default, Serialize)]
pub struct UndoReport {
    pub log_path: PathBuf,
    pub restored: usize,
    pub errors: Vec<String>,
    /// False when nothing could be restored and the log was kept for another attempt.
    pub log_removed: bool,
}

impl UndoReport {
    pub fn is_partial(&self) -> bool {
        self.restored > 0 && !self.errors.is_empty()
    }
}

impl Executor {
    /// Reverses the most recent transaction, newest operation first.
    ///
    /// Copies are deleted, renames are moved back unless something now occupies the original
    /// path. Failures are collected per operation. Returns `None` when there is no log.
    pub fn undo_last(&self) -> Result<Option<UndoReport>> {
        let _lock = self.lock();
        let Some(path) = self.log.latest()? else {
            return Ok(None);
        };
        let tx = self.log.load(&path)?;

        let mut report = UndoReport {
            log_path: path.clone(),
            ..UndoReport::default()
        };
        for op in tx.operations.iter().rev() {
            match reverse(op) {
                Ok(()) => report.restored += 1,
                Err(e) => {
                    warn!(path = %op.new_path.display(), error = %e, "undo step failed");
                    report.errors.push(format!("{}: {e:#}", op.new_path.display()));
                }
            }
        }

        if report.restored > 0 || tx.operations.is_empty() {
            self.log.remove(&path)?;
            report.log_removed = true;
        }
        info!(
            restored = report.restored,
            errors = report.errors.len(),
            "undo finished"
        );
        Ok(Some(report))
    }
}

fn reverse(op: &Operation) -> Result<()> {
    match op.kind {
        OperationKind::Copy => fs_apply::remove_file(&op.new_path),
        OperationKind::Rename => {
            if !op.new_path.exists() {
                anyhow::bail!("renamed file no longer exists");
            }
            fs_apply::move_file(&op.new_path, &op.old_path)
        }
    }
}
