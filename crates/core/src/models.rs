use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Where an [`ExtractedInfo`] record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoSource {
    #[default]
    Unknown,
    Content,
    Filename,
}

/// Metadata extracted for one document.
///
/// `year` is either a bare calendar year ("2024") or an academic year ("2024학년도");
/// the two are kept distinct. `month` is empty or a two-digit value in 01..=12.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    pub year: String,
    pub month: String,
    pub subject: String,
    pub subject_main: String,
    pub subject_sub: String,
    pub grade: String,
    pub confidence: f32,
    pub source: InfoSource,
    pub raw_text: String,
    pub header_text: String,
    pub is_smart_extracted: bool,
}

impl ExtractedInfo {
    pub fn with_source(source: InfoSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Adds `delta` to the confidence, keeping it within [0, 1].
    pub fn add_confidence(&mut self, delta: f32) {
        self.set_confidence(self.confidence + delta);
    }

    pub fn set_confidence(&mut self, value: f32) {
        self.confidence = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
    }

    /// Label used for display: fine subject beats broad subject.
    pub fn display_subject(&self) -> &str {
        if !self.subject.is_empty() {
            &self.subject
        } else if !self.subject_sub.is_empty() {
            &self.subject_sub
        } else {
            &self.subject_main
        }
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_empty()
            && self.month.is_empty()
            && self.subject.is_empty()
            && self.subject_main.is_empty()
            && self.subject_sub.is_empty()
            && self.grade.is_empty()
    }
}

/// Formats a month number as a two-digit code, rejecting anything outside 1..=12.
pub fn month_code(month: u32) -> Option<String> {
    (1..=12).contains(&month).then(|| format!("{:02}", month))
}

/// Parses a month written with one or two digits.
pub fn parse_month(raw: &str) -> Option<String> {
    raw.trim().parse::<u32>().ok().and_then(month_code)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Ready,
    NeedsReview,
    Duplicate,
    Renamed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Ready => "ready",
            FileStatus::NeedsReview => "needs_review",
            FileStatus::Duplicate => "duplicate",
            FileStatus::Renamed => "renamed",
            FileStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Renamed | FileStatus::Error)
    }
}

/// One file under consideration for renaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub original_path: PathBuf,
    pub original_name: String,
    /// Lowercase extension including the leading dot, or empty.
    pub extension: String,
    pub extracted_info: ExtractedInfo,
    pub proposed_name: String,
    pub status: FileStatus,
    pub error_message: String,
    pub order: usize,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let original_path = path.into();
        let original_name = original_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = original_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Self {
            original_path,
            original_name,
            extension,
            extracted_info: ExtractedInfo::default(),
            proposed_name: String::new(),
            status: FileStatus::Ready,
            error_message: String::new(),
            order: 0,
        }
    }

    /// Extension without the dot, as used for text source lookup.
    pub fn kind(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Directory the proposed name lands in: the destination folder if any, else the file's own.
    pub fn target_dir(&self, dest: Option<&Path>) -> PathBuf {
        match dest {
            Some(d) => d.to_path_buf(),
            None => self
                .original_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn proposed_file_name(&self) -> String {
        format!("{}{}", self.proposed_name, self.extension)
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = FileStatus::Error;
        self.error_message = message.into();
    }

    /// Applies a manual correction. Month is validated before anything is changed.
    pub fn apply_edit(&mut self, edit: EditInfo) -> Result<(), Error> {
        let month = if edit.month.trim().is_empty() {
            String::new()
        } else {
            parse_month(&edit.month).ok_or_else(|| Error::InvalidMonth(edit.month.clone()))?
        };
        let info = &mut self.extracted_info;
        info.year = edit.year.trim().to_string();
        info.month = month;
        info.grade = edit.grade.trim().to_string();
        info.subject = edit.subject.trim().to_string();
        info.is_smart_extracted = false;

        if !info.year.is_empty() || !info.month.is_empty() || !info.subject.is_empty() {
            self.status = FileStatus::Ready;
        }
        Ok(())
    }
}

/// User-supplied corrections for one entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditInfo {
    pub year: String,
    pub month: String,
    pub grade: String,
    pub subject: String,
}
