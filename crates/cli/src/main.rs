use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use cli::{Executor, UndoReport};
use renamer_core::config::{self, AppConfig};
use renamer_core::pipeline::{BatchAnalyzer, Progress};
use renamer_core::scanner::Scanner;
use renamer_core::sources::SourceRegistry;
use renamer_core::suggester;
use renamer_core::{Extractor, FileEntry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { paths, json } => {
            let entries = analyze(&cfg, &paths).await?;
            print_entries(&entries, json, false)
        }
        Commands::Preview {
            paths,
            pattern,
            dest,
            json,
        } => {
            let entries = plan(&cfg, &paths, pattern, dest.as_deref()).await?;
            print_entries(&entries, json, true)
        }
        Commands::Apply {
            paths,
            pattern,
            dest,
            dry_run,
            json,
        } => run_apply(&cfg, &paths, pattern, dest.as_deref(), dry_run, json).await,
        Commands::Undo { json } => run_undo(&cfg, json),
        Commands::Keywords => {
            for keyword in &cfg.keywords {
                println!("{keyword}");
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser)]
#[command(name = "smart-renamer")]
#[command(about = "Rename Korean office documents from their contents", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metadata from files and folders
    Analyze {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the names files would get
    Preview {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Naming pattern, e.g. "{Year}_{Month}_{Subject}"
        #[arg(long)]
        pattern: Option<String>,
        /// Copy into this folder instead of renaming in place
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename (or copy) files and record the transaction
    Apply {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Print the plan without touching any file
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    /// Reverse the most recent transaction
    Undo {
        #[arg(long)]
        json: bool,
    },
    /// Print the configured keyword list
    Keywords,
}

async fn analyze(cfg: &AppConfig, paths: &[PathBuf]) -> Result<Vec<FileEntry>> {
    let scanner = Scanner::new(&cfg.scan)?;
    let entries = scanner.scan(paths)?;
    info!(files = entries.len(), "scan complete");
    if entries.is_empty() {
        return Ok(entries);
    }

    let extractor = Extractor::from_config(cfg)?;
    let analyzer = BatchAnalyzer::new(
        extractor,
        SourceRegistry::with_defaults(),
        cfg.analysis.workers,
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing files already in progress");
            interrupt.store(true, Ordering::SeqCst);
        }
    });

    let (tx, mut rx) = mpsc::channel::<Progress>(100);
    let reporter = tokio::spawn(async move {
        while let Some(p) = rx.recv().await {
            debug!(completed = p.completed, total = p.total, "progress");
        }
    });

    let outcome = analyzer.analyze_batch(entries, Some(tx), cancel).await;
    let _ = reporter.await;
    watcher.abort();
    if outcome.cancelled {
        bail!(
            "analysis cancelled after {} of {} files",
            outcome.completed,
            outcome.entries.len()
        );
    }
    Ok(outcome.entries)
}

async fn plan(
    cfg: &AppConfig,
    paths: &[PathBuf],
    pattern: Option<String>,
    dest: Option<&Path>,
) -> Result<Vec<FileEntry>> {
    let mut entries = analyze(cfg, paths).await?;
    let mut naming = cfg.naming.clone();
    if let Some(p) = pattern {
        naming.pattern = p;
    }
    suggester::generate_all_names(&mut entries, &naming, cfg.engine.ready_threshold);
    suggester::resolve_duplicates(&mut entries, dest);
    Ok(entries)
}

async fn run_apply(
    cfg: &AppConfig,
    paths: &[PathBuf],
    pattern: Option<String>,
    dest: Option<&Path>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let mut entries = plan(cfg, paths, pattern, dest).await?;
    if dry_run {
        info!(planned = entries.len(), "dry run, no files changed");
        return print_entries(&entries, json, true);
    }

    let executor = Executor::new(&cfg.logs.dir);
    let report = executor.execute(&mut entries, dest)?;
    if json {
        let out = serde_json::json!({ "report": report, "entries": entries });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_entries(&entries, false, true)?;
        println!(
            "apply summary: renamed={}, skipped={}, failed={}",
            report.renamed, report.skipped, report.failed
        );
        if let Some(log) = &report.log_path {
            println!("transaction log: {}", log.display());
        }
    }
    Ok(())
}

fn run_undo(cfg: &AppConfig, json: bool) -> Result<()> {
    let executor = Executor::new(&cfg.logs.dir);
    let report: Option<UndoReport> = executor.undo_last()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    match report {
        None => println!("nothing to undo"),
        Some(r) => {
            let outcome = if r.errors.is_empty() {
                "complete"
            } else if r.is_partial() {
                "partial"
            } else {
                "failed"
            };
            println!("undo {outcome}: restored {} file(s)", r.restored);
            for e in &r.errors {
                println!("  error: {e}");
            }
            if !r.log_removed {
                println!("log kept: {}", r.log_path.display());
            }
        }
    }
    Ok(())
}

fn print_entries(entries: &[FileEntry], json: bool, with_names: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    for entry in entries {
        let info = &entry.extracted_info;
        let file = entry
            .original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut line = format!(
            "{:<12} {} | year={} month={} grade={} subject={} conf={:.2}",
            entry.status.as_str(),
            file,
            info.year,
            info.month,
            info.grade,
            info.display_subject(),
            info.confidence
        );
        if with_names && !entry.proposed_name.is_empty() {
            line.push_str(&format!(" -> {}", entry.proposed_file_name()));
        }
        if !entry.error_message.is_empty() {
            line.push_str(&format!(" ({})", entry.error_message));
        }
        println!("{line}");
    }
    Ok(())
}
