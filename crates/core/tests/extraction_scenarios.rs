use renamer_core::config::{AppConfig, NamingConfig};
use renamer_core::sources::{SourceRegistry, TextSource};
use renamer_core::suggester::{generate_all_names, resolve_duplicates};
use renamer_core::{Extractor, FileEntry, FileStatus, InfoSource};
use std::path::Path;
use std::sync::Arc;

struct Blank;

impl TextSource for Blank {
    fn name(&self) -> &'static str {
        "blank"
    }
    fn read_text(&self, _path: &Path) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

fn extractor() -> Extractor {
    Extractor::from_config(&AppConfig::default()).unwrap()
}

#[test]
fn academic_year_with_mock_exam_month() {
    let info = extractor().extract_from_text(
        "2024학년도 고1 7월 모의고사 문제지\n국어 영역\n성명 수험번호",
    );
    assert_eq!(info.year, "2024학년도");
    assert_eq!(info.month, "07");
    assert_eq!(info.grade, "고1");
    assert!(info.confidence >= 0.45);
    assert_eq!(info.source, InfoSource::Content);
}

#[test]
fn national_exam_title_gives_november_and_no_math() {
    let info = extractor().extract_from_text("대학수학능력시험 문제지\n홀수형");
    assert_eq!(info.year, "");
    assert_eq!(info.month, "11");
    assert_ne!(info.subject, "수학");
    assert_ne!(info.subject_main, "수학");
    assert_ne!(info.subject_main, "과학");
    assert_eq!(info.subject, "문제지");
}

#[test]
fn unreadable_document_falls_back_to_file_name() {
    let ex = extractor();
    let registry = SourceRegistry::new().with_source("hwp", Arc::new(Blank));
    let mut entry = FileEntry::new("/data/2025-07-지구과학.hwp");
    ex.analyze(&mut entry, &registry);

    let from_name = ex.extract_from_filename(&entry.original_path);
    let info = &entry.extracted_info;
    assert!((from_name.confidence - 0.9).abs() < 1e-6);
    assert_eq!(info.year, from_name.year);
    assert_eq!(info.month, from_name.month);
    assert_eq!(info.subject, from_name.subject);
    assert_eq!(info.year, "2025");
    assert_eq!(info.month, "07");
    assert_eq!(info.source, InfoSource::Filename);
    assert!(info.confidence < ex.ready_threshold());
    assert_eq!(entry.status, FileStatus::NeedsReview);
}

#[test]
fn missing_source_for_extension_also_falls_back() {
    let ex = extractor();
    let mut entry = FileEntry::new("/data/scan0001.pdf");
    ex.analyze(&mut entry, &SourceRegistry::new());
    assert_eq!(entry.extracted_info.source, InfoSource::Filename);
    assert_eq!(entry.status, FileStatus::NeedsReview);
}

#[test]
fn duplicate_names_in_batch_and_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let naming = NamingConfig {
        pattern: "report".into(),
        max_len: 100,
    };
    let fresh = || {
        vec![
            FileEntry::new(dir.path().join("a.pdf")),
            FileEntry::new(dir.path().join("b.pdf")),
        ]
    };

    let mut entries = fresh();
    generate_all_names(&mut entries, &naming, 0.5);
    resolve_duplicates(&mut entries, None);
    assert_eq!(entries[0].proposed_file_name(), "report.pdf");
    assert_eq!(entries[1].proposed_file_name(), "report(1).pdf");
    assert_eq!(entries[1].status, FileStatus::Duplicate);

    std::fs::write(dir.path().join("report(1).pdf"), b"taken").unwrap();
    let mut entries = fresh();
    generate_all_names(&mut entries, &naming, 0.5);
    resolve_duplicates(&mut entries, None);
    assert_eq!(entries[1].proposed_file_name(), "report(2).pdf");
    assert_eq!(entries[1].status, FileStatus::Duplicate);
}

#[test]
fn destination_folder_is_the_collision_scope() {
    let src = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    std::fs::write(dest.path().join("report.pdf"), b"taken").unwrap();

    let mut entries = vec![FileEntry::new(src.path().join("a.pdf"))];
    entries[0].proposed_name = "report".into();
    resolve_duplicates(&mut entries, Some(dest.path()));
    assert_eq!(entries[0].proposed_name, "report(1)");

    let mut entries = vec![FileEntry::new(src.path().join("a.pdf"))];
    entries[0].proposed_name = "report".into();
    resolve_duplicates(&mut entries, None);
    assert_eq!(entries[0].proposed_name, "report");
}
