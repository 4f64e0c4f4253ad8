//! Second opinion read from the file name alone.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::FilenameConfidence;
use crate::grade;
use crate::models::{parse_month, ExtractedInfo, InfoSource};
use crate::vocabulary::Vocabulary;

static ACADEMIC_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20[0-9]{2})학년도").unwrap());
static COMPACT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20\d{2})[-_./](\d{1,2})").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20[0-9]{2})년?").unwrap());
static MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})월").unwrap());

/// Extracts year, month, subject and grade from a file stem.
pub fn extract(stem: &str, vocab: &Vocabulary, table: &FilenameConfidence) -> ExtractedInfo {
    let mut info = ExtractedInfo::with_source(InfoSource::Filename);

    if let Some(caps) = ACADEMIC_YEAR.captures(stem) {
        info.year = format!("{}학년도", &caps[1]);
    } else if let Some(caps) = COMPACT_DATE.captures(stem) {
        info.year = caps[1].to_string();
        if let Some(month) = parse_month(&caps[2]) {
            info.month = month;
        }
    } else if let Some(caps) = YEAR.captures(stem) {
        info.year = caps[1].to_string();
    }

    if info.month.is_empty() {
        if let Some(month) = MONTH.captures(stem).and_then(|caps| parse_month(&caps[1])) {
            info.month = month;
        } else if vocab.mentions_national_exam(stem) {
            info.month = "11".to_string();
        }
    }

    if let Some(sub) = vocab.find_subcategory(stem) {
        info.subject_sub = sub.to_string();
        info.subject = sub.to_string();
    } else if let Some(main) = vocab.find_category(stem) {
        info.subject_main = main.to_string();
        info.subject = main.to_string();
    } else if let Some(doc) = vocab.find_document_type(stem) {
        info.subject = doc.to_string();
    }

    if let Some(grade) = grade::extract_grade(stem) {
        info.grade = grade;
    }

    info.set_confidence(score(&info, table));
    info
}

/// Confidence for a record that only the file name backs.
pub fn score(info: &ExtractedInfo, table: &FilenameConfidence) -> f32 {
    let year = !info.year.is_empty();
    let month = !info.month.is_empty();
    let subject = !info.subject.is_empty();
    match (year, month, subject) {
        (true, true, true) => table.year_month_subject,
        (true, true, false) => table.year_month,
        (true, false, true) => table.year_subject,
        _ => table.other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stem: &str) -> ExtractedInfo {
        extract(stem, &Vocabulary::default(), &FilenameConfidence::default())
    }

    #[test]
    fn compact_date_gives_year_and_month() {
        let info = run("2025-07-지구과학");
        assert_eq!(info.year, "2025");
        assert_eq!(info.month, "07");
        assert_eq!(info.subject, "지구과학");
        assert_eq!(info.subject_sub, "지구과학");
        assert_eq!(info.source, InfoSource::Filename);
        assert!((info.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn academic_year_wins_over_plain_year() {
        let info = run("2024학년도 고2 6월 모의평가 영어");
        assert_eq!(info.year, "2024학년도");
        assert_eq!(info.month, "06");
        assert_eq!(info.grade, "고2");
        assert_eq!(info.subject, "영어");
        assert_eq!(info.subject_main, "영어");
    }

    #[test]
    fn national_exam_name_means_november() {
        let info = run("2023 수능 국어 해설");
        assert_eq!(info.month, "11");
        assert_eq!(info.year, "2023");
    }

    #[test]
    fn invalid_month_is_dropped() {
        let info = run("2024_13_회의록");
        assert_eq!(info.year, "2024");
        assert_eq!(info.month, "");
        assert_eq!(info.subject, "회의록");
        assert!((info.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn empty_stem_is_low_confidence() {
        let info = run("scan0001");
        assert!(info.is_empty());
        assert!((info.confidence - 0.3).abs() < 1e-6);
    }
}
