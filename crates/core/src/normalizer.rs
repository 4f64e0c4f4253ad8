//! Header windowing and noise cleanup applied before any pattern matching.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[PAGE\]").unwrap());
static CONTACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:e-mail|tel|fax)\s*:\s*\S*").unwrap());
static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\s*\d+\s*-").unwrap());
static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\s*$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// The leading part of a document that extraction looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    /// Non-empty, trimmed lines in document order.
    pub lines: Vec<String>,
    /// The lines joined with newlines.
    pub text: String,
}

impl Header {
    /// Takes up to `max_lines` non-empty lines, stopping once `max_chars` characters are collected.
    pub fn from_text(text: &str, max_lines: usize, max_chars: usize) -> Self {
        let composed: String = text.nfc().collect();
        let mut lines = Vec::new();
        let mut total = 0usize;
        for line in composed.lines().take(max_lines) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            total += line.chars().count();
            lines.push(line.to_string());
            if total >= max_chars {
                break;
            }
        }
        let text = lines.join("\n");
        Self { lines, text }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Removes page markers, contact details, page numbers and digit-only lines, then
/// flattens everything onto a single whitespace-normalized line.
pub fn clean(text: &str) -> String {
    let kept: Vec<String> = text
        .lines()
        .filter(|line| !DIGITS_ONLY.is_match(line))
        .map(|line| {
            let line = PAGE_MARKER.replace_all(line, " ");
            let line = CONTACT.replace_all(&line, " ");
            PAGE_NUMBER.replace_all(&line, " ").into_owned()
        })
        .collect();
    collapse_whitespace(&kept.join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Replaces every match of the mask patterns with a single space.
pub fn mask(text: &str, masks: &[Regex]) -> String {
    masks.iter().fold(text.to_string(), |acc, re| {
        re.replace_all(&acc, " ").into_owned()
    })
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_skips_blank_lines_and_stops_at_char_budget() {
        let text = "첫 줄\n\n   \n둘째 줄\n셋째 줄";
        let header = Header::from_text(text, 40, 1500);
        assert_eq!(header.lines, vec!["첫 줄", "둘째 줄", "셋째 줄"]);

        let capped = Header::from_text("aaaa\nbbbb\ncccc", 40, 6);
        assert_eq!(capped.lines, vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn header_line_window_counts_raw_lines() {
        let text = "a1\n\nb2\nc3";
        let header = Header::from_text(text, 2, 1500);
        assert_eq!(header.lines, vec!["a1"]);
    }

    #[test]
    fn clean_drops_noise() {
        let text = "[PAGE] 2024학년도 학업성적관리\nTel: 02-123-4567\n- 3 -\n12\n수학 영역";
        let cleaned = clean(text);
        assert_eq!(cleaned, "2024학년도 학업성적관리 수학 영역");
    }

    #[test]
    fn mask_removes_exam_title() {
        let masks = vec![Regex::new(r"대학\s*수학\s*능력\s*시험").unwrap()];
        let masked = mask("2025학년도 대학수학능력시험 문제지", &masks);
        assert!(!masked.contains("수학"));
        assert!(masked.contains("문제지"));
    }

    #[test]
    fn decomposed_hangul_is_composed() {
        let decomposed: String = "수학".nfd().collect();
        let header = Header::from_text(&decomposed, 40, 1500);
        assert_eq!(header.text, "수학");
    }
}
