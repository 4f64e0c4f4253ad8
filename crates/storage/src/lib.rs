//! Storage layer: rename transaction logs.
//!
//! Each executed batch is persisted as one JSON file in the log directory, named after the
//! moment it was written so that the newest log sorts last.

use anyhow::Context;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PREFIX: &str = "transaction_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Rename,
    Copy,
}

/// One file-system change: `old_path` was renamed or copied to `new_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTransaction {
    pub timestamp: String,
    pub operations: Vec<Operation>,
}

impl RenameTransaction {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            operations,
        }
    }
}

/// Transaction log files in one directory.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    dir: PathBuf,
}

impl TransactionLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `tx` to a new `transaction_<YYYYmmdd_HHMMSS_mmm>.json` file and returns its path.
    pub fn save(&self, tx: &RenameTransaction) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating log dir {}", self.dir.display()))?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let mut path = self.dir.join(format!("{PREFIX}{stamp}.json"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{PREFIX}{stamp}_{n}.json"));
            n += 1;
        }
        let body = serde_json::to_string_pretty(tx)?;
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), operations = tx.operations.len(), "transaction log saved");
        Ok(path)
    }

    /// Path of the most recent log, if any.
    pub fn latest(&self) -> anyhow::Result<Option<PathBuf>> {
        if !self.dir.exists() {
            return Ok(None);
        }
        let mut logs = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("reading log dir {}", self.dir.display()))?
        {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(PREFIX) && n.ends_with(".json"))
                .unwrap_or(false);
            if is_log {
                logs.push(path);
            }
        }
        logs.sort();
        debug!(count = logs.len(), "transaction logs found");
        Ok(logs.pop())
    }

    pub fn load(&self, path: &Path) -> anyhow::Result<RenameTransaction> {
        let body =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&body).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn remove(&self, path: &Path) -> anyhow::Result<()> {
        fs::remove_file(path).with_context(|| format!("removing {}", path.display()))
    }
}
