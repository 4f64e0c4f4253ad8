use crate::models::{ExtractedInfo, InfoSource};

/// Combines a content record with a second opinion.
///
/// A file-name record is trusted for month outright, for year only when content has none
/// or the file name also carries the month, and for the fine subject over anything content
/// found. Any other secondary record only fills gaps. The primary's confidence and source
/// are kept.
pub fn merge(mut primary: ExtractedInfo, secondary: &ExtractedInfo) -> ExtractedInfo {
    if secondary.source == InfoSource::Filename {
        if !secondary.year.is_empty()
            && (primary.year.is_empty()
                || (!secondary.month.is_empty() && primary.month.is_empty()))
        {
            primary.year = secondary.year.clone();
        }
        if !secondary.month.is_empty() {
            primary.month = secondary.month.clone();
        }
        if !secondary.subject_sub.is_empty() {
            primary.subject_sub = secondary.subject_sub.clone();
            primary.subject = secondary.subject_sub.clone();
        } else if !secondary.subject.is_empty() && primary.subject.is_empty() {
            primary.subject = secondary.subject.clone();
        }
    } else {
        fill(&mut primary.year, &secondary.year);
        fill(&mut primary.month, &secondary.month);
        fill(&mut primary.subject, &secondary.subject);
        fill(&mut primary.subject_main, &secondary.subject_main);
        fill(&mut primary.subject_sub, &secondary.subject_sub);
    }
    fill(&mut primary.grade, &secondary.grade);
    primary
}

fn fill(target: &mut String, value: &str) {
    if target.is_empty() && !value.is_empty() {
        *target = value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> ExtractedInfo {
        ExtractedInfo {
            year: "2024학년도".into(),
            month: "03".into(),
            subject: "과학".into(),
            subject_main: "과학".into(),
            confidence: 0.8,
            source: InfoSource::Content,
            ..ExtractedInfo::default()
        }
    }

    #[test]
    fn filename_month_overrides_content() {
        let name = ExtractedInfo {
            year: "2025".into(),
            month: "07".into(),
            subject: "지구과학".into(),
            subject_sub: "지구과학".into(),
            grade: "고1".into(),
            source: InfoSource::Filename,
            ..ExtractedInfo::default()
        };
        let merged = merge(content(), &name);
        // Content already has a month, so its academic year stays.
        assert_eq!(merged.year, "2024학년도");
        assert_eq!(merged.month, "07");
        assert_eq!(merged.subject, "지구과학");
        assert_eq!(merged.subject_sub, "지구과학");
        assert_eq!(merged.grade, "고1");
        assert_eq!(merged.confidence, 0.8);
        assert_eq!(merged.source, InfoSource::Content);
    }

    #[test]
    fn filename_year_with_month_replaces_year_when_content_lacks_month() {
        let mut primary = content();
        primary.month.clear();
        let name = ExtractedInfo {
            year: "2025".into(),
            month: "07".into(),
            source: InfoSource::Filename,
            ..ExtractedInfo::default()
        };
        let merged = merge(primary, &name);
        assert_eq!(merged.year, "2025");
        assert_eq!(merged.month, "07");
    }

    #[test]
    fn filename_subject_fills_only_gaps() {
        let name = ExtractedInfo {
            subject: "회의록".into(),
            source: InfoSource::Filename,
            ..ExtractedInfo::default()
        };
        assert_eq!(merge(content(), &name).subject, "과학");
    }

    #[test]
    fn non_filename_secondary_only_fills() {
        let other = ExtractedInfo {
            year: "2019".into(),
            month: "12".into(),
            subject_sub: "화학".into(),
            grade: "중3".into(),
            source: InfoSource::Content,
            ..ExtractedInfo::default()
        };
        let merged = merge(content(), &other);
        assert_eq!(merged.year, "2024학년도");
        assert_eq!(merged.month, "03");
        assert_eq!(merged.subject, "과학");
        assert_eq!(merged.subject_sub, "화학");
        assert_eq!(merged.grade, "중3");
    }

    #[test]
    fn empty_secondary_is_identity() {
        let empty = ExtractedInfo::with_source(InfoSource::Filename);
        assert_eq!(merge(content(), &empty), content());
    }
}
