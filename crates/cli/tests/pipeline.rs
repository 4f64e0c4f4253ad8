use cli::Executor;
use renamer_core::config::AppConfig;
use renamer_core::pipeline::BatchAnalyzer;
use renamer_core::scanner::Scanner;
use renamer_core::sources::{SourceRegistry, TextSource};
use renamer_core::suggester::{generate_all_names, resolve_duplicates};
use renamer_core::{Extractor, FileStatus};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Treats the file body as already-extracted document text.
struct PlainText;

impl TextSource for PlainText {
    fn name(&self) -> &'static str {
        "plain"
    }
    fn read_text(&self, path: &Path) -> anyhow::Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

#[tokio::test]
async fn scan_analyze_name_apply_and_undo() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("inbox");
    fs::create_dir(&src).unwrap();
    fs::write(
        src.join("scan01.hwp"),
        "2024학년도 고2 9월 전국연합학력평가 문제지\n영어 영역",
    )
    .unwrap();
    fs::write(
        src.join("scan02.hwp"),
        "2024학년도 고2 9월 전국연합학력평가 문제지\n영어 영역",
    )
    .unwrap();
    fs::write(src.join("2023-05-회의록.pdf"), "").unwrap();
    fs::write(src.join("readme.txt"), "ignored").unwrap();

    let mut cfg = AppConfig::default();
    cfg.naming.pattern = "{Year}_{Month}_{Grade}_{Subject}".into();
    cfg.logs.dir = temp.path().join("logs").to_string_lossy().into_owned();

    let entries = Scanner::new(&cfg.scan).unwrap().scan(&[src.clone()]).unwrap();
    assert_eq!(entries.len(), 3);

    let sources = SourceRegistry::new()
        .with_source("hwp", Arc::new(PlainText))
        .with_source("pdf", Arc::new(PlainText));
    let analyzer = BatchAnalyzer::new(Extractor::from_config(&cfg).unwrap(), sources, 2);
    let mut entries = analyzer.analyze_all(entries).await;

    generate_all_names(&mut entries, &cfg.naming, cfg.engine.ready_threshold);
    resolve_duplicates(&mut entries, None);
    let names: Vec<_> = entries.iter().map(|e| e.proposed_file_name()).collect();
    assert_eq!(
        names,
        vec![
            "2023_05_회의록.pdf",
            "2024학년도_09_고2_영어.hwp",
            "2024학년도_09_고2_영어(1).hwp",
        ]
    );
    assert_eq!(entries[2].status, FileStatus::Duplicate);

    let exec = Executor::new(&cfg.logs.dir);
    let report = exec.execute(&mut entries, None).unwrap();
    assert_eq!(report.renamed, 3);
    assert!(src.join("2024학년도_09_고2_영어(1).hwp").exists());
    assert!(!src.join("scan01.hwp").exists());

    let undo = exec.undo_last().unwrap().unwrap();
    assert_eq!(undo.restored, 3);
    assert!(src.join("scan01.hwp").exists());
    assert!(src.join("scan02.hwp").exists());
    assert!(src.join("2023-05-회의록.pdf").exists());
}
