//! Proposed file names: pattern rendering and collision resolution.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::NamingConfig;
use crate::models::{FileEntry, FileStatus};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const EDGE: &[char] = &['_', '-', ' '];

/// Placeholders recognised in a naming pattern.
pub const PLACEHOLDERS: &[&str] = &[
    "{Year}",
    "{Month}",
    "{Subject}",
    "{SubjectMain}",
    "{SubjectSub}",
    "{Original}",
    "{Seq}",
    "{Grade}",
];

/// Renders `pattern` for the entry at `index` in a batch of `total`.
pub fn generate_new_name(
    entry: &FileEntry,
    pattern: &str,
    index: usize,
    total: usize,
    max_len: usize,
) -> String {
    let info = &entry.extracted_info;
    let or = |value: &str, fallback: &str| {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    };
    let seq = if total >= 100 {
        format!("{:03}", index + 1)
    } else {
        format!("{:02}", index + 1)
    };
    let subject_main = if info.subject_main.is_empty() {
        or(&info.subject, "기타")
    } else {
        info.subject_main.clone()
    };

    let replacements = [
        ("{Year}", or(&info.year, "XXXX")),
        ("{Month}", or(&info.month, "XX")),
        ("{SubjectMain}", subject_main),
        ("{SubjectSub}", info.subject_sub.clone()),
        ("{Subject}", or(&info.subject, "기타")),
        ("{Original}", entry.original_name.clone()),
        ("{Seq}", seq),
        ("{Grade}", info.grade.clone()),
    ];
    let rendered = replacements
        .iter()
        .fold(pattern.to_string(), |acc, (token, value)| {
            acc.replace(token, value)
        });
    clean_name(&rendered, max_len)
}

/// Strips characters that are illegal in file names, collapses whitespace and repeated
/// separators, trims separators from both ends and caps the length.
pub fn clean_name(name: &str, max_len: usize) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !ILLEGAL.contains(c) && !c.is_control())
        .collect();
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    let collapsed = UNDERSCORES.replace_all(&collapsed, "_");
    let collapsed = DASHES.replace_all(&collapsed, "-");
    let trimmed = collapsed.trim_matches(EDGE);
    let capped: String = trimmed.chars().take(max_len).collect();
    capped.trim_matches(EDGE).to_string()
}

/// Names every entry in list order and records that order.
///
/// A duplicate flag from an earlier resolution no longer applies to the fresh name, so it
/// falls back to the confidence-derived status.
pub fn generate_all_names(
    entries: &mut [FileEntry],
    naming: &NamingConfig,
    ready_threshold: f32,
) {
    let total = entries.len();
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.order = i;
        if entry.status == FileStatus::Duplicate {
            entry.status = if entry.extracted_info.confidence >= ready_threshold {
                FileStatus::Ready
            } else {
                FileStatus::NeedsReview
            };
        }
        entry.proposed_name = generate_new_name(entry, &naming.pattern, i, total, naming.max_len);
    }
}

fn name_key(dir: &Path, name: &str, ext: &str) -> (PathBuf, String) {
    (dir.to_path_buf(), format!("{}{}", name, ext).to_lowercase())
}

/// Makes proposed names unique per target directory, both within the batch and against
/// files already on disk. Renamed entries are flagged [`FileStatus::Duplicate`].
///
/// Entries in the error state are ignored. Running it again over resolved names keeps
/// every duplicate flag already set.
pub fn resolve_duplicates(entries: &mut [FileEntry], dest: Option<&Path>) {
    let active: Vec<usize> = (0..entries.len())
        .filter(|&i| !entries[i].status.is_terminal())
        .collect();
    let bases: HashMap<usize, String> = active
        .iter()
        .map(|&i| (i, entries[i].proposed_name.clone()))
        .collect();

    // Pass 1: within the batch. Every base name is reserved before suffixes are handed out.
    let mut groups: HashMap<(PathBuf, String), Vec<usize>> = HashMap::new();
    let mut order: Vec<(PathBuf, String)> = Vec::new();
    for &i in &active {
        let entry = &entries[i];
        let key = name_key(&entry.target_dir(dest), &entry.proposed_name, &entry.extension);
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(i);
    }
    let mut claimed: HashSet<(PathBuf, String)> = groups.keys().cloned().collect();

    for key in &order {
        let members = &groups[key];
        let mut n = 1;
        for &i in members.iter().skip(1) {
            let entry = &mut entries[i];
            let dir = entry.target_dir(dest);
            let base = &bases[&i];
            loop {
                let candidate = format!("{}({})", base, n);
                n += 1;
                let candidate_key = name_key(&dir, &candidate, &entry.extension);
                if claimed.insert(candidate_key) {
                    entry.proposed_name = candidate;
                    entry.status = FileStatus::Duplicate;
                    break;
                }
            }
        }
    }

    // Pass 2: against the file system.
    for &i in &active {
        let entry = &mut entries[i];
        let dir = entry.target_dir(dest);
        let target = dir.join(entry.proposed_file_name());
        if !target.exists() || target == entry.original_path {
            continue;
        }
        claimed.remove(&name_key(&dir, &entry.proposed_name, &entry.extension));
        let base = &bases[&i];
        let mut n = 1;
        loop {
            let candidate = format!("{}({})", base, n);
            n += 1;
            let path = dir.join(format!("{}{}", candidate, entry.extension));
            let key = name_key(&dir, &candidate, &entry.extension);
            if (!path.exists() || path == entry.original_path) && !claimed.contains(&key) {
                claimed.insert(key);
                tracing::debug!(from = %entry.proposed_name, to = %candidate, "name taken on disk");
                entry.proposed_name = candidate;
                entry.status = FileStatus::Duplicate;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedInfo;
    use std::fs;

    fn entry(path: &str, info: ExtractedInfo) -> FileEntry {
        let mut e = FileEntry::new(path);
        e.extracted_info = info;
        e
    }

    #[test]
    fn placeholders_and_defaults() {
        let e = entry(
            "/x/scan.pdf",
            ExtractedInfo {
                year: "2024학년도".into(),
                subject: "물리학 세특".into(),
                subject_sub: "물리학".into(),
                grade: "고2".into(),
                ..ExtractedInfo::default()
            },
        );
        let name = generate_new_name(
            &e,
            "{Year}_{Month}_{Grade}_{Subject}_{SubjectMain}_{SubjectSub}_{Original}_{Seq}",
            4,
            10,
            100,
        );
        assert_eq!(name, "2024학년도_XX_고2_물리학 세특_물리학 세특_물리학_scan_05");
    }

    #[test]
    fn missing_grade_does_not_leave_double_separators() {
        let e = entry("/x/a.pdf", ExtractedInfo::default());
        let name = generate_new_name(&e, "{Grade}__{Year}-{Month}--{Subject}_{Grade}", 0, 150, 100);
        assert_eq!(name, "XXXX-XX-기타");
        assert_eq!(generate_new_name(&e, "{Seq}", 0, 150, 100), "001");
    }

    #[test]
    fn clean_name_strips_and_caps() {
        assert_eq!(clean_name("  a<b>:c\"d/e\\f|g?h*  ", 100), "abcdefgh");
        assert_eq!(clean_name("x\u{7}  y\t z", 100), "x y z");
        assert_eq!(clean_name(&"가".repeat(150), 100).chars().count(), 100);
        assert_eq!(clean_name("abc_____", 4), "abc");
    }

    #[test]
    fn batch_collisions_get_counters() {
        let mut entries = vec![
            entry("/d/a.pdf", ExtractedInfo::default()),
            entry("/d/b.pdf", ExtractedInfo::default()),
            entry("/d/c.PDF", ExtractedInfo::default()),
            entry("/other/d.pdf", ExtractedInfo::default()),
        ];
        for e in entries.iter_mut() {
            e.proposed_name = "Report".into();
        }
        entries[2].proposed_name = "report".into();
        resolve_duplicates(&mut entries, None);
        let names: Vec<_> = entries.iter().map(|e| e.proposed_name.as_str()).collect();
        assert_eq!(names, vec!["Report", "Report(1)", "report(2)", "Report"]);
        assert_eq!(entries[0].status, FileStatus::Ready);
        assert_eq!(entries[1].status, FileStatus::Duplicate);
        assert_eq!(entries[3].status, FileStatus::Ready);
    }

    #[test]
    fn resolving_twice_keeps_duplicate_flags() {
        let mut entries = vec![
            entry("/d/a.pdf", ExtractedInfo::default()),
            entry("/d/b.pdf", ExtractedInfo::default()),
        ];
        for e in entries.iter_mut() {
            e.proposed_name = "Report".into();
        }
        resolve_duplicates(&mut entries, None);
        resolve_duplicates(&mut entries, None);
        assert_eq!(entries[0].proposed_name, "Report");
        assert_eq!(entries[1].proposed_name, "Report(1)");
        assert_eq!(entries[1].status, FileStatus::Duplicate);
    }

    #[test]
    fn renaming_clears_a_stale_duplicate_flag() {
        let naming = NamingConfig {
            pattern: "{Subject}".into(),
            max_len: 100,
        };
        let confident = ExtractedInfo {
            subject: "국어".into(),
            confidence: 0.7,
            ..ExtractedInfo::default()
        };
        let mut entries = vec![
            entry("/d/a.pdf", confident),
            entry("/d/b.pdf", ExtractedInfo::default()),
        ];
        entries[0].status = FileStatus::Duplicate;
        entries[1].status = FileStatus::Duplicate;
        generate_all_names(&mut entries, &naming, 0.5);
        assert_eq!(entries[0].status, FileStatus::Ready);
        assert_eq!(entries[1].status, FileStatus::NeedsReview);
    }

    #[test]
    fn existing_files_push_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report(1).pdf"), b"x").unwrap();
        let mut entries = vec![
            FileEntry::new(dir.path().join("one.pdf")),
            FileEntry::new(dir.path().join("two.pdf")),
        ];
        for e in entries.iter_mut() {
            e.proposed_name = "report".into();
        }
        resolve_duplicates(&mut entries, None);
        assert_eq!(entries[0].proposed_name, "report");
        assert_eq!(entries[1].proposed_name, "report(2)");
        assert_eq!(entries[1].status, FileStatus::Duplicate);
    }

    #[test]
    fn own_file_is_not_a_collision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"x").unwrap();
        let mut entries = vec![FileEntry::new(&path)];
        entries[0].proposed_name = "report".into();
        resolve_duplicates(&mut entries, None);
        assert_eq!(entries[0].proposed_name, "report");
        assert_eq!(entries[0].status, FileStatus::Ready);
    }
}
