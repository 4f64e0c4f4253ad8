//! Best-effort document text, one reader per document format.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub mod binary;
pub mod hwp;
pub mod hwpx;
pub mod pdf;

pub use binary::BinarySniffer;
pub use hwp::HwpSource;
pub use hwpx::HwpxSource;
pub use pdf::PdfSource;

/// Something that can pull plain text out of a file.
///
/// An empty string means "nothing usable"; errors are reserved for failures worth logging.
pub trait TextSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn read_text(&self, path: &Path) -> anyhow::Result<String>;
}

/// Text sources keyed by lowercase extension. Each extension has an ordered chain.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    chains: HashMap<String, Vec<Arc<dyn TextSource>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readers for the supported formats. Container readers come first, the encoding
    /// sniffer is the last resort for legacy HWP files.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_source("pdf", Arc::new(PdfSource))
            .with_source("hwpx", Arc::new(HwpxSource))
            .with_source("hwp", Arc::new(HwpSource))
            .with_source("hwp", Arc::new(BinarySniffer::default()))
    }

    /// Appends `source` to the chain for `ext`.
    pub fn with_source(mut self, ext: &str, source: Arc<dyn TextSource>) -> Self {
        self.chains
            .entry(ext.trim_start_matches('.').to_lowercase())
            .or_default()
            .push(source);
        self
    }

    pub fn supports(&self, ext: &str) -> bool {
        self.chains.contains_key(&ext.trim_start_matches('.').to_lowercase())
    }

    /// Runs the chain for `ext` until a source yields non-blank text.
    ///
    /// Returns an empty string when every source came back empty, and the last error when
    /// every source failed.
    pub fn read_text(&self, path: &Path, ext: &str) -> anyhow::Result<String> {
        let key = ext.trim_start_matches('.').to_lowercase();
        let Some(chain) = self.chains.get(&key) else {
            return Ok(String::new());
        };
        let mut last_err = None;
        let mut any_ok = false;
        for source in chain {
            match source.read_text(path) {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => {
                    any_ok = true;
                    tracing::debug!(source = source.name(), path = %path.display(), "no text");
                }
                Err(e) => {
                    tracing::debug!(source = source.name(), path = %path.display(), error = %e, "source failed");
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) if !any_ok => Err(e),
            _ => Ok(String::new()),
        }
    }
}

/// True when `text` looks like real Korean prose rather than decoding debris: at least 10
/// characters, with Hangul syllables making up at least a fifth of the non-space ones.
pub fn passes_quality_gate(text: &str) -> bool {
    if text.chars().count() < 10 {
        return false;
    }
    let mut hangul = 0usize;
    let mut total = 0usize;
    for c in text.chars().filter(|c| *c != ' ') {
        total += 1;
        if is_hangul_syllable(c) {
            hangul += 1;
        }
    }
    total > 0 && hangul as f64 / total as f64 >= 0.2
}

pub fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}
