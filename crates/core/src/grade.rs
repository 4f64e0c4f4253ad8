//! School level and grade, normalized to a one-letter level plus the grade number ("고2").

use once_cell::sync::Lazy;
use regex::Regex;

static COMPACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(고|중)\s*([1-3])").unwrap());
static SPELLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(고등학교|중학교|초등학교|고등|중등|초등)\s*([1-6])\s*학년").unwrap()
});

/// Tries compact notation first ("고1", "중 3"), then spelled-out school level and grade.
pub fn extract_grade(text: &str) -> Option<String> {
    compact_grade(text).or_else(|| spelled_grade(text))
}

/// "고1"-style notation. A following digit means this was part of a longer number.
pub fn compact_grade(text: &str) -> Option<String> {
    COMPACT.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if text[whole.end()..].starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Some(format!("{}{}", &caps[1], &caps[2]))
    })
}

fn spelled_grade(text: &str) -> Option<String> {
    SPELLED.captures_iter(text).find_map(|caps| {
        let level = match &caps[1] {
            "고등학교" | "고등" => "고",
            "중학교" | "중등" => "중",
            _ => "초",
        };
        let n: u32 = caps[2].parse().ok()?;
        let max = if level == "초" { 6 } else { 3 };
        (n <= max).then(|| format!("{}{}", level, n))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_forms() {
        assert_eq!(extract_grade("2024학년도 고1 3월").as_deref(), Some("고1"));
        assert_eq!(extract_grade("중 2 기말고사").as_deref(), Some("중2"));
        assert_eq!(compact_grade("고12"), None);
    }

    #[test]
    fn spelled_forms() {
        assert_eq!(
            extract_grade("고등학교 2학년 수학").as_deref(),
            Some("고2")
        );
        assert_eq!(extract_grade("초등학교 5 학년").as_deref(), Some("초5"));
        assert_eq!(extract_grade("중학교 5학년"), None);
        assert_eq!(extract_grade("교육과정 편성"), None);
    }
}
