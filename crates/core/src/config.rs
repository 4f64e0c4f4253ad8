use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub weights: Weights,
    pub naming: NamingConfig,
    pub scan: ScanConfig,
    pub analysis: AnalysisConfig,
    pub logs: LogConfig,
    pub vocabulary: VocabularyConfig,
    /// User keyword list, consulted in order before the built-in subject tables.
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub header_max_lines: usize,
    pub header_max_chars: usize,
    pub raw_text_max_chars: usize,
    /// Entries at or above this confidence are `ready`, the rest need review.
    pub ready_threshold: f32,
    /// Upper bound on confidence when a document's text could not be read and only the
    /// file name was usable. Kept below `ready_threshold` so such entries are reviewed.
    pub unreadable_confidence_cap: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            header_max_lines: 40,
            header_max_chars: 1500,
            raw_text_max_chars: 3000,
            ready_threshold: 0.5,
            unreadable_confidence_cap: 0.3,
        }
    }
}

/// Confidence contributed by each extraction stage.
///
/// These are tuning values, not derived ones; keep them configurable so they can be
/// calibrated against real sample documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub exam_month: f32,
    pub academic_year: f32,
    pub academic_year_month_bonus: f32,
    pub year_month: f32,
    pub bare_year: f32,
    pub month_detail: f32,
    pub retry_year: f32,
    pub retry_month: f32,
    pub bracket: f32,
    pub user_keyword: f32,
    pub exam_period: f32,
    pub subject_with_doc_type: f32,
    pub doc_type: f32,
    pub subject: f32,
    pub suffix_guess: f32,
    pub smart_keyword: f32,
    pub filename_only: FilenameConfidence,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            exam_month: 0.45,
            academic_year: 0.4,
            academic_year_month_bonus: 0.1,
            year_month: 0.35,
            bare_year: 0.2,
            month_detail: 0.1,
            retry_year: 0.2,
            retry_month: 0.2,
            bracket: 0.6,
            user_keyword: 0.7,
            exam_period: 0.65,
            subject_with_doc_type: 0.6,
            doc_type: 0.4,
            subject: 0.35,
            suffix_guess: 0.2,
            smart_keyword: 0.15,
            filename_only: FilenameConfidence::default(),
        }
    }
}

/// Confidence assigned when only the filename could be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameConfidence {
    pub year_month_subject: f32,
    pub year_month: f32,
    pub year_subject: f32,
    pub other: f32,
}

impl Default for FilenameConfidence {
    fn default() -> Self {
        Self {
            year_month_subject: 0.9,
            year_month: 0.7,
            year_subject: 0.6,
            other: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub pattern: String,
    pub max_len: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            pattern: "{Year}_{Month}_{Grade}_{Subject}".to_string(),
            max_len: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Lowercase extensions without the dot.
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub recursive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["hwp".into(), "hwpx".into(), "pdf".into()],
            exclude: Vec::new(),
            recursive: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub workers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub path: Option<String>,
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("RENAMER")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
