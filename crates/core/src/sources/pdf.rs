use std::path::Path;

use super::TextSource;

/// PDF text layer via `pdf-extract`. Without the `pdf` feature it always yields nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfSource;

impl TextSource for PdfSource {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn read_text(&self, path: &Path) -> anyhow::Result<String> {
        pdf_text(path)
    }
}

#[cfg(feature = "pdf")]
fn pdf_text(path: &Path) -> anyhow::Result<String> {
    use anyhow::Context;
    pdf_extract::extract_text(path).with_context(|| format!("reading pdf {}", path.display()))
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(_path: &Path) -> anyhow::Result<String> {
    Ok(String::new())
}
