//! HWPX: a ZIP container of OWPML parts.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

use super::{passes_quality_gate, TextSource};

/// Parts of the package that carry document text.
#[cfg(feature = "office")]
const TEXT_PARTS: &[&str] = &["header", "footer", "section", "content", "masterpage"];

#[derive(Debug, Default, Clone, Copy)]
pub struct HwpxSource;

impl TextSource for HwpxSource {
    fn name(&self) -> &'static str {
        "hwpx"
    }

    fn read_text(&self, path: &Path) -> anyhow::Result<String> {
        let text = package_text(path)?;
        Ok(if passes_quality_gate(&text) {
            text
        } else {
            String::new()
        })
    }
}

#[cfg(feature = "office")]
fn package_text(path: &Path) -> anyhow::Result<String> {
    use anyhow::Context;
    use std::io::Read;

    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("reading zip container {}", path.display()))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.ends_with(".xml") && TEXT_PARTS.iter().any(|p| lower.contains(p))
        })
        .map(String::from)
        .collect();
    names.sort();

    let mut parts = Vec::new();
    for name in names {
        let mut bytes = Vec::new();
        match archive.by_name(&name) {
            Ok(mut entry) => {
                if let Err(e) = entry.read_to_end(&mut bytes) {
                    tracing::debug!(part = %name, error = %e, "unreadable hwpx part");
                    continue;
                }
            }
            Err(e) => {
                tracing::debug!(part = %name, error = %e, "missing hwpx part");
                continue;
            }
        }
        match xml_text(&bytes) {
            Ok(text) if text.trim().chars().count() > 5 => parts.push(text),
            Ok(_) => {}
            Err(e) => tracing::debug!(part = %name, error = %e, "malformed hwpx part"),
        }
    }
    Ok(parts.join("\n"))
}

#[cfg(not(feature = "office"))]
fn package_text(_path: &Path) -> anyhow::Result<String> {
    Ok(String::new())
}

/// Text nodes of an XML part. Each closed paragraph element ends a line.
pub fn xml_text(bytes: &[u8]) -> anyhow::Result<String> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut out = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(&e.unescape()?);
            }
            Event::End(e) if e.local_name().as_ref() == b"p" => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(out.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<hs:sec xmlns:hs="urn:hs" xmlns:hp="urn:hp">
  <hp:p><hp:run><hp:t>2024학년도 1학기</hp:t></hp:run></hp:p>
  <hp:p><hp:run><hp:t>물리학 &amp; 화학</hp:t></hp:run><hp:run><hp:t>수행평가</hp:t></hp:run></hp:p>
</hs:sec>"#;
        let text = xml_text(xml.as_bytes()).unwrap();
        assert_eq!(text, "2024학년도 1학기\n물리학 & 화학 수행평가");
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(xml_text(b"<a><b></a>").is_err());
    }
}
