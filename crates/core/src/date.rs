//! Year, month and grade extraction from cleaned header text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Weights;
use crate::grade;
use crate::models::{parse_month, ExtractedInfo};
use crate::normalizer::strip_whitespace;
use crate::rules::{first_match, Patch, Rule};
use crate::vocabulary::Vocabulary;

pub(crate) static EXAM_MONTH: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d{1,2})\s*월\s*(?:고\d|중\d)",
        r"(\d{1,2})\s*월\s*(?:전국연합|모의|학력)",
        r"(\d{1,2})\s*월\s*(?:평가|고사|시험)",
        r"(?:고\d|중\d)\s*(\d{1,2})\s*월",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub(crate) static ACADEMIC_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(20\d{2})\s*학년도").unwrap());
static CALENDAR_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(20\d{2})\s*년").unwrap());
static ANY_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})\s*월").unwrap());
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(20\d{2})\s*년\s*(\d{1,2})\s*월").unwrap());
static DAY_AHEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d{1,2}\s*일").unwrap());

static NUMBERED_SERIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"제\s*(20\d{2})\s*-\s*\d+\s*호").unwrap());
static DOTTED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(20\d{2})\s*\.\s*\d{1,2}\s*\.\s*\d{1,2}").unwrap());
static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])(20[0-9]{2})(?:[^0-9]|$)").unwrap());

static MOCK_MONTH: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d{1,2})\s*월\s*모의",
        r"(\d{1,2})\s*월\s*학력",
        r"모의\s*(?:고사|평가)?\s*(\d{1,2})\s*월",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static FIRST_SEMESTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"1\s*학기").unwrap());
static SECOND_SEMESTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"2\s*학기").unwrap());

static COLLAPSED_ACADEMIC_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(20\d{2})학년도").unwrap());
static COLLAPSED_EXAM_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})월(?:고|중|전국|학력|모의)").unwrap());

/// Read-only input shared by the date rules.
pub struct DateContext<'a> {
    pub text: &'a str,
    pub vocab: &'a Vocabulary,
    pub weights: &'a Weights,
}

/// Date tiers, highest priority first. Only one fires per document.
fn date_rules<'a>() -> [Rule<DateContext<'a>>; 4] {
    [
        Rule {
            name: "exam_month",
            weight: |w: &Weights| w.exam_month,
            matcher: exam_month,
        },
        Rule {
            name: "academic_year",
            weight: |w: &Weights| w.academic_year,
            matcher: academic_year,
        },
        Rule {
            name: "year_month",
            weight: |w: &Weights| w.year_month,
            matcher: year_month,
        },
        Rule {
            name: "bare_year",
            weight: |w: &Weights| w.bare_year,
            matcher: bare_year,
        },
    ]
}

/// First capture of any pattern that parses as a valid month.
fn first_valid_month(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures_iter(text)
            .find_map(|caps| parse_month(caps.get(1)?.as_str()))
    })
}

fn academic_year_token(text: &str) -> Option<String> {
    ACADEMIC_YEAR
        .captures(text)
        .map(|caps| format!("{}학년도", &caps[1]))
}

fn exam_month(ctx: &DateContext<'_>) -> Option<Patch> {
    let month = first_valid_month(&EXAM_MONTH, ctx.text)?;
    let year = academic_year_token(ctx.text)
        .or_else(|| CALENDAR_YEAR.captures(ctx.text).map(|c| c[1].to_string()));
    Some(Patch::month(month).with_year(year))
}

fn academic_year(ctx: &DateContext<'_>) -> Option<Patch> {
    let year = academic_year_token(ctx.text)?;
    let month = ANY_MONTH
        .captures_iter(ctx.text)
        .find_map(|caps| parse_month(&caps[1]));
    let bonus = if month.is_some() {
        ctx.weights.academic_year_month_bonus
    } else {
        0.0
    };
    Some(Patch::year(year).with_month(month).with_bonus(bonus))
}

/// "YYYY년 M월" that is not the start of a full "YYYY년 M월 D일" timestamp.
fn year_month_pair(text: &str) -> Option<(String, String)> {
    YEAR_MONTH.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if DAY_AHEAD.is_match(&text[whole.end()..]) {
            return None;
        }
        let month = parse_month(&caps[2])?;
        Some((caps[1].to_string(), month))
    })
}

fn year_month(ctx: &DateContext<'_>) -> Option<Patch> {
    let (year, month) = year_month_pair(ctx.text)?;
    Some(Patch::year(year).with_month(Some(month)))
}

/// A year candidate is discarded when a grade marker follows it closely.
fn grade_marker_follows(text: &str, end: usize) -> bool {
    let ahead: String = text[end..].chars().take(10).collect();
    ahead.contains("학년")
}

fn bare_year(ctx: &DateContext<'_>) -> Option<Patch> {
    for re in [&*NUMBERED_SERIES, &*DOTTED_DATE, &*BARE_YEAR] {
        let found = re.captures_iter(ctx.text).find_map(|caps| {
            let year = caps.get(1)?;
            (!grade_marker_follows(ctx.text, year.end())).then(|| year.as_str().to_string())
        });
        if let Some(year) = found {
            return Some(Patch::year(year));
        }
    }
    None
}

type MonthMatcher = fn(&str, &Vocabulary) -> Option<String>;

/// Month fallbacks, tried in order once a year is known.
static MONTH_DETAIL: &[(&str, MonthMatcher)] = &[
    ("exam_month", |text: &str, _: &Vocabulary| {
        first_valid_month(&EXAM_MONTH, text)
    }),
    ("year_month", |text: &str, _: &Vocabulary| {
        year_month_pair(text).map(|(_, m)| m)
    }),
    ("national_exam", |text: &str, vocab: &Vocabulary| {
        vocab.mentions_national_exam(text).then(|| "11".to_string())
    }),
    ("mock_exam", mock_exam_month),
    ("period", |text: &str, vocab: &Vocabulary| {
        lookup_month(&vocab.period_months, text)
    }),
    ("semester", semester_month),
];

fn mock_exam_month(text: &str, vocab: &Vocabulary) -> Option<String> {
    first_valid_month(&MOCK_MONTH, text).or_else(|| lookup_month(&vocab.mock_exam_months, text))
}

/// Month of the first table key found in `text`. A key starting with a digit must not be
/// preceded by another digit, so "13월 모의고사" does not read as "3월 모의고사".
fn lookup_month(table: &[(String, String)], text: &str) -> Option<String> {
    table
        .iter()
        .find(|(key, _)| {
            text.match_indices(key.as_str()).any(|(at, _)| {
                !key.starts_with(|c: char| c.is_ascii_digit())
                    || !text[..at].ends_with(|c: char| c.is_ascii_digit())
            })
        })
        .and_then(|(_, month)| parse_month(month))
}

fn semester_month(text: &str, _vocab: &Vocabulary) -> Option<String> {
    let midterm = text.contains("중간");
    let final_term = text.contains("기말");
    let month = if FIRST_SEMESTER.is_match(text) {
        match (midterm, final_term) {
            (true, _) => "04",
            (false, true) => "06",
            _ => "03",
        }
    } else if SECOND_SEMESTER.is_match(text) {
        match (midterm, final_term) {
            (true, _) => "10",
            (false, true) => "12",
            _ => "09",
        }
    } else {
        return None;
    };
    Some(month.to_string())
}

/// Month implied by exam, period or semester wording. Empty when nothing matches.
pub fn month_detail(text: &str, vocab: &Vocabulary) -> String {
    MONTH_DETAIL
        .iter()
        .find_map(|(_, matcher)| matcher(text, vocab))
        .unwrap_or_default()
}

/// Runs the date chain, grade extraction and the whitespace-stripped retry over `text`.
pub fn extract(info: &mut ExtractedInfo, ctx: &DateContext<'_>) {
    if let Some(fired) = first_match(&date_rules(), ctx, ctx.weights) {
        tracing::debug!(rule = fired.rule, "date rule matched");
        fired.apply_to(info);
    }

    if !info.year.is_empty() && info.month.is_empty() {
        let month = month_detail(ctx.text, ctx.vocab);
        if !month.is_empty() {
            info.month = month;
            info.add_confidence(ctx.weights.month_detail);
        }
    }

    // The national exam is always sat in November, year or not.
    if info.month.is_empty() && ctx.vocab.mentions_national_exam(ctx.text) {
        info.month = "11".to_string();
        info.add_confidence(ctx.weights.month_detail);
    }

    if info.grade.is_empty() {
        if let Some(grade) = grade::extract_grade(ctx.text) {
            info.grade = grade;
        }
    }

    if info.year.is_empty() || info.month.is_empty() || info.grade.is_empty() {
        retry_collapsed(info, ctx);
    }
}

/// Second attempt against the header with all whitespace removed, for text where the
/// decoder split tokens apart ("2 0 2 4 학 년 도").
fn retry_collapsed(info: &mut ExtractedInfo, ctx: &DateContext<'_>) {
    let collapsed = strip_whitespace(ctx.text);
    if info.year.is_empty() {
        if let Some(caps) = COLLAPSED_ACADEMIC_YEAR.captures(&collapsed) {
            info.year = format!("{}학년도", &caps[1]);
            info.add_confidence(ctx.weights.retry_year);
        }
    }
    if info.month.is_empty() {
        let month = COLLAPSED_EXAM_MONTH
            .captures_iter(&collapsed)
            .find_map(|caps| collapsed_month(&collapsed, caps.get(1)?));
        if let Some(month) = month {
            info.month = month;
            info.add_confidence(ctx.weights.retry_month);
        }
    }
    if info.grade.is_empty() {
        if let Some(grade) = grade::compact_grade(&collapsed) {
            info.grade = grade;
        }
    }
}

/// Collapsing "고 2 7 월" glues the grade digit onto the month ("고27월"). When the
/// two-digit capture sits right after a grade marker and is no month, its last digit is.
fn collapsed_month(collapsed: &str, digits: regex::Match<'_>) -> Option<String> {
    parse_month(digits.as_str()).or_else(|| {
        let glued = digits.as_str().len() == 2
            && collapsed[..digits.start()].ends_with(['고', '중']);
        glued.then(|| parse_month(&digits.as_str()[1..])).flatten()
    })
}
