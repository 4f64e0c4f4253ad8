//! Subject and document-type extraction.
//!
//! Subject keywords are matched against a copy of the header with exam-title phrases
//! masked out, so that "대학수학능력시험" never yields "수학". Tiers are tried in table
//! order; the fine and broad subject fields are recorded whichever tier wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Weights;
use crate::models::ExtractedInfo;
use crate::rules::{first_match, Patch, Rule};
use crate::vocabulary::Vocabulary;

static BRACKETS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"영역\s*\(([가-힣]+(?:\s*[IⅠⅡ1-2]+)?)\)",
        r"\(([가-힣]+\s*[IⅠⅡ1-2]+)\)",
        r"<([가-힣a-zA-Z0-9]+(?:탐구|영역)?)>\s*영역",
        r"<([가-힣a-zA-Z0-9]+)>",
        r"\[([가-힣a-zA-Z0-9\s]+)\]",
        r"【([가-힣a-zA-Z0-9\s]+)】",
        r"《([가-힣a-zA-Z0-9\s]+)》",
        r"「([가-힣a-zA-Z0-9\s]+)」",
        r"『([가-힣a-zA-Z0-9\s]+)』",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BRACKET_EXCLUDES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d+점$",
        r"^\d+번$",
        r"^\d+$",
        r"^제\d+",
        r"^총\d+",
        r"^각\d+",
        r"(?i)^page",
        r"^\d+페이지$",
        r"^[A-Za-z]$",
        r"^[1-9]~[1-9]$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static PERIOD_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"제\s*([1-4])\s*교시").unwrap());
static PERIOD_PLAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([1-4])\s*교시").unwrap());

pub struct CategoryContext<'a> {
    /// Cleaned header, single line.
    pub text: &'a str,
    /// `text` with noise phrases masked.
    pub masked: &'a str,
    /// Header lines as they appear in the document.
    pub lines: &'a [String],
    pub vocab: &'a Vocabulary,
    pub keywords: &'a [String],
    /// One pattern per vocabulary suffix, see [`suffix_patterns`].
    pub suffix_patterns: &'a [Regex],
}

impl<'a> CategoryContext<'a> {
    /// Fine subject if present, else broad subject, both from the masked text.
    fn subject(&self) -> Option<&'a str> {
        self.vocab
            .find_subcategory(self.masked)
            .or_else(|| self.vocab.find_category(self.masked))
    }

    fn document_type(&self) -> Option<&'a str> {
        self.vocab.find_document_type(self.text)
    }
}

fn category_rules<'a>() -> [Rule<CategoryContext<'a>>; 7] {
    [
        Rule {
            name: "bracket",
            weight: |w: &Weights| w.bracket,
            matcher: bracket,
        },
        Rule {
            name: "user_keyword",
            weight: |w: &Weights| w.user_keyword,
            matcher: user_keyword,
        },
        Rule {
            name: "exam_period",
            weight: |w: &Weights| w.exam_period,
            matcher: exam_period,
        },
        Rule {
            name: "subject_with_doc_type",
            weight: |w: &Weights| w.subject_with_doc_type,
            matcher: subject_with_doc_type,
        },
        Rule {
            name: "doc_type",
            weight: |w: &Weights| w.doc_type,
            matcher: |ctx: &CategoryContext<'_>| ctx.document_type().map(Patch::subject),
        },
        Rule {
            name: "subject",
            weight: |w: &Weights| w.subject,
            matcher: |ctx: &CategoryContext<'_>| ctx.subject().map(Patch::subject),
        },
        Rule {
            name: "suffix_guess",
            weight: |w: &Weights| w.suffix_guess,
            matcher: suffix_guess,
        },
    ]
}

/// Content of the first delimited span that looks like a label rather than a page
/// number, point value or lone letter.
pub fn bracket_span(text: &str) -> Option<String> {
    BRACKETS.iter().find_map(|re| {
        let found = re.captures(text)?.get(1)?.as_str().trim();
        let len = found.chars().count();
        if !(2..=15).contains(&len) {
            return None;
        }
        if BRACKET_EXCLUDES.iter().any(|ex| ex.is_match(found)) {
            return None;
        }
        Some(found.to_string())
    })
}

fn bracket(ctx: &CategoryContext<'_>) -> Option<Patch> {
    bracket_span(ctx.text).map(Patch::subject)
}

fn user_keyword(ctx: &CategoryContext<'_>) -> Option<Patch> {
    let keyword = ctx
        .keywords
        .iter()
        .map(|k| k.trim())
        .find(|k| !k.is_empty() && ctx.masked.contains(k))?;
    let label = ctx
        .lines
        .iter()
        .find(|line| line.contains(keyword))
        .map(|line| expand_compound(line, keyword))
        .unwrap_or_else(|| keyword.to_string());
    Some(Patch::subject(label))
}

/// Extends `keyword` with up to two words that precede it on `line`
/// ("주간 개발팀 회의록" for keyword "회의록").
pub fn expand_compound(line: &str, keyword: &str) -> String {
    let pattern = format!(r"((?:\S+\s+){{0,2}}){}", regex::escape(keyword));
    let prefix = Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    if prefix.is_empty() {
        keyword.to_string()
    } else {
        format!("{} {}", prefix, keyword)
    }
}

fn exam_period(ctx: &CategoryContext<'_>) -> Option<Patch> {
    if !ctx.text.contains("교시") {
        return None;
    }
    let caps = PERIOD_NUMBERED
        .captures(ctx.text)
        .or_else(|| PERIOD_PLAIN.captures(ctx.text))?;
    let period: usize = caps[1].parse().ok()?;
    // Period 4 covers several elective subjects, so it names none.
    if period > 3 {
        return None;
    }
    let subject = ctx.vocab.exam_period_subjects.get(period - 1)?;
    let label = match ctx.document_type() {
        Some(doc) if !ctx.vocab.is_exam_artifact(doc) => format!("{} {}", subject, doc),
        _ => subject.clone(),
    };
    Some(Patch::subject(label))
}

fn subject_with_doc_type(ctx: &CategoryContext<'_>) -> Option<Patch> {
    let subject = ctx.subject()?;
    let doc = ctx.document_type()?;
    let label = if ctx.vocab.is_exam_artifact(doc) {
        subject.to_string()
    } else {
        format!("{} {}", subject, doc)
    };
    Some(Patch::subject(label))
}

fn suffix_guess(ctx: &CategoryContext<'_>) -> Option<Patch> {
    ctx.lines.iter().take(7).find_map(|line| {
        ctx.suffix_patterns.iter().find_map(|re| {
            let word = re.captures(line)?.get(1)?.as_str();
            let usable = word.chars().count() >= 2
                && !ctx.vocab.is_stopword(word)
                && !word.chars().all(|c| c.is_ascii_digit());
            usable.then(|| Patch::subject(word))
        })
    })
}

/// Compiles one "word ending in this morpheme" pattern per suffix.
pub fn suffix_patterns(vocab: &Vocabulary) -> Vec<Regex> {
    vocab
        .suffixes
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            Regex::new(&format!(r"(\S{{2,8}}{})(?:\s|$|[,.])", regex::escape(s))).ok()
        })
        .collect()
}

/// Runs the category chain and records the fine/broad subject fields.
pub fn extract(info: &mut ExtractedInfo, ctx: &CategoryContext<'_>, weights: &Weights) {
    if let Some(sub) = ctx.vocab.find_subcategory(ctx.masked) {
        info.subject_sub = sub.to_string();
    } else if let Some(main) = ctx.vocab.find_category(ctx.masked) {
        info.subject_main = main.to_string();
    }

    if let Some(fired) = first_match(&category_rules(), ctx, weights) {
        tracing::debug!(rule = fired.rule, "category rule matched");
        fired.apply_to(info);
    }
}
