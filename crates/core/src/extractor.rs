//! The metadata extraction engine.

use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

use crate::category::{self, CategoryContext};
use crate::config::{AppConfig, EngineConfig, Weights};
use crate::date::{self, DateContext};
use crate::error::Result;
use crate::filename;
use crate::merge::merge;
use crate::models::{ExtractedInfo, FileEntry, FileStatus, InfoSource};
use crate::normalizer::{self, Header};
use crate::sources::SourceRegistry;
use crate::title;
use crate::vocabulary::Vocabulary;

/// Extracts [`ExtractedInfo`] from document text and file names.
///
/// Holds only read-only state, so one instance can be shared across worker threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    vocab: Vocabulary,
    engine: EngineConfig,
    weights: Weights,
    keywords: Vec<String>,
    masks: Vec<Regex>,
    suffixes: Vec<Regex>,
}

impl Extractor {
    pub fn new(vocab: Vocabulary, config: &AppConfig) -> Result<Self> {
        let masks = vocab.compile_noise_masks()?;
        let suffixes = category::suffix_patterns(&vocab);
        Ok(Self {
            vocab,
            engine: config.engine.clone(),
            weights: config.weights.clone(),
            keywords: config.keywords.clone(),
            masks,
            suffixes,
        })
    }

    /// Builds an extractor from configuration, loading the vocabulary file if one is set.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let vocab = match &config.vocabulary.path {
            Some(path) => Vocabulary::load(Path::new(path))?,
            None => Vocabulary::default(),
        };
        Self::new(vocab, config)
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn ready_threshold(&self) -> f32 {
        self.engine.ready_threshold
    }

    /// Runs the full content pipeline over document text.
    pub fn extract_from_text(&self, text: &str) -> ExtractedInfo {
        let mut info = ExtractedInfo::with_source(InfoSource::Content);
        let header = Header::from_text(
            text,
            self.engine.header_max_lines,
            self.engine.header_max_chars,
        );
        info.header_text = header.text.clone();
        info.raw_text = normalizer::truncate_chars(text, self.engine.raw_text_max_chars);
        if header.is_empty() {
            return info;
        }

        let cleaned = normalizer::clean(&header.text);
        let masked = normalizer::mask(&cleaned, &self.masks);

        date::extract(
            &mut info,
            &DateContext {
                text: &cleaned,
                vocab: &self.vocab,
                weights: &self.weights,
            },
        );

        let ctx = CategoryContext {
            text: &cleaned,
            masked: &masked,
            lines: &header.lines,
            vocab: &self.vocab,
            keywords: &self.keywords,
            suffix_patterns: &self.suffixes,
        };
        category::extract(&mut info, &ctx, &self.weights);

        if info.subject.is_empty() {
            if let Some(subject) = title::title_keyword(&header.lines, &self.vocab, &self.masks) {
                debug!(%subject, "subject from title line");
                info.subject = subject;
            }
        }

        if info.subject.is_empty() {
            let masked_header = normalizer::mask(&header.text, &self.masks);
            if let Some(subject) = title::smart_keyword(&masked_header, &self.vocab) {
                debug!(%subject, "subject from smart keyword");
                info.subject = subject;
                info.is_smart_extracted = true;
                info.add_confidence(self.weights.smart_keyword);
            }
        }

        info
    }

    /// File-name-only record for `path`.
    pub fn extract_from_filename(&self, path: &Path) -> ExtractedInfo {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        filename::extract(&stem, &self.vocab, &self.weights.filename_only)
    }

    /// Reads the document through `sources`, extracts, merges with the file-name record
    /// and sets the entry's status. Decode failures degrade to the file-name record with
    /// its confidence capped at `unreadable_confidence_cap`.
    pub fn analyze(&self, entry: &mut FileEntry, sources: &SourceRegistry) {
        let from_name = self.extract_from_filename(&entry.original_path);

        let primary = match sources.read_text(&entry.original_path, entry.kind()) {
            Ok(text) if !text.trim().is_empty() => self.extract_from_text(&text),
            Ok(_) => {
                debug!(path = %entry.original_path.display(), "no usable text, using file name");
                self.unreadable(&from_name)
            }
            Err(e) => {
                warn!(path = %entry.original_path.display(), error = %e, "could not read document text");
                self.unreadable(&from_name)
            }
        };

        entry.extracted_info = merge(primary, &from_name);
        entry.error_message.clear();
        entry.status = self.status_for(&entry.extracted_info);
    }

    fn unreadable(&self, from_name: &ExtractedInfo) -> ExtractedInfo {
        let mut info = from_name.clone();
        info.set_confidence(info.confidence.min(self.engine.unreadable_confidence_cap));
        info
    }

    pub fn status_for(&self, info: &ExtractedInfo) -> FileStatus {
        if info.confidence >= self.engine.ready_threshold {
            FileStatus::Ready
        } else {
            FileStatus::NeedsReview
        }
    }
}
