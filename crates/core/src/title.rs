//! Fallback labels for documents the category chain could not classify.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalizer;
use crate::vocabulary::Vocabulary;

static TITLE_EXCLUDES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^20\d{2}[-./]",
        r"^[0-9]+$",
        r"(?i)^(대외비|Confidential|비공개)$",
        r"^제\s*\d+\s*교시$",
        r"^(홀수|짝수)형$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static SPECIAL_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

static SMART_BRACKETS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[\[【]([가-힣a-zA-Z0-9]+(?:\s*[가-힣a-zA-Z0-9]+)*)[\]】]",
        r"\(([가-힣]{2,6})\)",
        r"[<《]([가-힣a-zA-Z0-9]+(?:\s*[가-힣a-zA-Z0-9]+)*)[>》]",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static LEAD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([가-힣a-zA-Z0-9\s]{2,10})[:：\-]").unwrap());
static HANGUL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[가-힣]{2,6}").unwrap());

const TITLE_WINDOW: usize = 7;
const SMART_WINDOW: usize = 200;

fn title_score(index: usize, line: &str, vocab: &Vocabulary, masked: &str) -> i32 {
    let len = line.chars().count();
    let mut score = (20 - 3 * index as i32).max(0);
    if (10..=40).contains(&len) {
        score += 15;
    }
    if SPECIAL_CHAR.find_iter(line).count() <= 2 {
        score += 10;
    }
    if vocab.find_subcategory(masked).is_some() {
        score += 25;
    }
    if vocab.find_category(masked).is_some() {
        score += 20;
    }
    score
}

/// Picks the most title-like of the first header lines and returns the subject keyword
/// it contains, if any.
pub fn title_keyword(lines: &[String], vocab: &Vocabulary, masks: &[Regex]) -> Option<String> {
    let mut best: Option<(i32, String)> = None;
    for (i, line) in lines.iter().take(TITLE_WINDOW).enumerate() {
        let len = line.chars().count();
        if !(4..=60).contains(&len) || TITLE_EXCLUDES.iter().any(|re| re.is_match(line)) {
            continue;
        }
        let masked = normalizer::mask(line, masks);
        let score = title_score(i, line, vocab, &masked);
        if score > best.as_ref().map_or(0, |(s, _)| *s) {
            best = Some((score, masked));
        }
    }
    let (_, masked) = best?;
    vocab
        .find_subcategory(&masked)
        .or_else(|| vocab.find_category(&masked))
        .map(str::to_string)
}

/// Guesses a label from arbitrary header text: a bracketed span, then a "label:" lead on
/// the first line, then the first plausible Hangul noun.
pub fn smart_keyword(header: &str, vocab: &Vocabulary) -> Option<String> {
    let from_brackets = SMART_BRACKETS.iter().find_map(|re| {
        let candidate = re.captures(header)?.get(1)?.as_str().trim();
        let len = candidate.chars().count();
        ((2..=15).contains(&len) && !vocab.is_stopword(candidate)).then(|| candidate.to_string())
    });
    if from_brackets.is_some() {
        return from_brackets;
    }

    let first_line = header.lines().next().unwrap_or("").trim();
    if let Some(caps) = LEAD_TOKEN.captures(first_line) {
        let candidate = caps[1].trim();
        if !candidate.is_empty() && !vocab.is_stopword(candidate) {
            return Some(candidate.to_string());
        }
    }

    let window = normalizer::truncate_chars(header, SMART_WINDOW);
    HANGUL_WORD
        .find_iter(&window)
        .map(|m| m.as_str())
        .find(|word| {
            !vocab.is_stopword(word)
                && !word.chars().any(|c| c.is_ascii_digit())
                && !vocab.verb_endings.iter().any(|end| word.ends_with(end.as_str()))
        })
        .map(str::to_string)
}
