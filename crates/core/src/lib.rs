//! Core library: metadata extraction from Korean office documents, naming and batch analysis.

pub mod category;
pub mod config;
pub mod date;
pub mod error;
pub mod extractor;
pub mod filename;
pub mod grade;
pub mod merge;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod rules;
pub mod scanner;
pub mod sources;
pub mod suggester;
pub mod title;
pub mod vocabulary;

pub use error::{Error, Result};
pub use extractor::Extractor;
pub use models::{EditInfo, ExtractedInfo, FileEntry, FileStatus, InfoSource};
pub use vocabulary::Vocabulary;
