//! Legacy HWP: an OLE compound file whose body streams are raw-deflated UTF-16LE records.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::{passes_quality_gate, TextSource};

static EDIT_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}년\s*\d{1,2}월\s*\d{1,2}일.*\d{1,2}[:시]").unwrap());

/// Lines containing any of these are editor metadata, not document text.
const METADATA_MARKERS: &[&str] = &[
    "administrator",
    "win32",
    "windows",
    "user !",
    "오전",
    "오후",
    "월요일",
    "화요일",
    "수요일",
    "목요일",
    "금요일",
    "토요일",
    "일요일",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct HwpSource;

impl TextSource for HwpSource {
    fn name(&self) -> &'static str {
        "hwp-ole"
    }

    fn read_text(&self, path: &Path) -> anyhow::Result<String> {
        let text = strip_metadata_lines(&container_text(path)?);
        Ok(if passes_quality_gate(&text) {
            text
        } else {
            String::new()
        })
    }
}

#[cfg(feature = "office")]
fn container_text(path: &Path) -> anyhow::Result<String> {
    use anyhow::Context;
    use std::io::Read;

    const SUMMARY: &str = "\u{5}HwpSummaryInformation";
    const TEXT_STREAMS: &[&str] = &["BodyText", "Section", "DocInfo"];

    let mut file =
        cfb::open(path).with_context(|| format!("opening ole container {}", path.display()))?;
    let streams: Vec<std::path::PathBuf> = file
        .walk()
        .filter(|entry| entry.is_stream())
        .map(|entry| entry.path().to_path_buf())
        .filter(|p| {
            let s = p.to_string_lossy();
            s.contains(SUMMARY) || TEXT_STREAMS.iter().any(|t| s.contains(t))
        })
        .collect();

    let mut parts = Vec::new();
    for stream_path in streams {
        let mut raw = Vec::new();
        let read = file
            .open_stream(&stream_path)
            .and_then(|mut stream| stream.read_to_end(&mut raw));
        if let Err(e) = read {
            tracing::debug!(stream = %stream_path.display(), error = %e, "unreadable hwp stream");
            continue;
        }
        let text = decode_utf16_record_text(&inflate_or_raw(&raw));
        if text.trim().chars().count() > 5 {
            parts.push(text);
        }
    }
    Ok(parts.join("\n"))
}

#[cfg(not(feature = "office"))]
fn container_text(_path: &Path) -> anyhow::Result<String> {
    Ok(String::new())
}

/// Body streams are usually raw deflate; fall back to the bytes as stored.
#[cfg(feature = "office")]
fn inflate_or_raw(data: &[u8]) -> Vec<u8> {
    use std::io::Read;
    let mut out = Vec::new();
    match flate2::read::DeflateDecoder::new(data).read_to_end(&mut out) {
        Ok(_) if !out.is_empty() => out,
        _ => data.to_vec(),
    }
}

/// Keeps Hangul syllables, jamo, printable ASCII and line breaks from little-endian
/// UTF-16 units; everything else in the record stream is control data.
pub fn decode_utf16_record_text(data: &[u8]) -> String {
    let mut out = String::new();
    for pair in data.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]) as u32;
        let keep = (0xAC00..=0xD7A3).contains(&unit)
            || (0x3130..=0x318F).contains(&unit)
            || (0x20..=0x7E).contains(&unit)
            || unit == 0x09;
        if unit == 0x0A || unit == 0x0D {
            if !out.ends_with('\n') {
                out.push('\n');
            }
        } else if keep {
            if let Some(c) = char::from_u32(unit) {
                out.push(c);
            }
        }
    }
    out.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops account names, OS strings and edit timestamps that the container stores
/// alongside the body.
pub fn strip_metadata_lines(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            !METADATA_MARKERS.iter().any(|m| lower.contains(m)) && !EDIT_TIMESTAMP.is_match(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
