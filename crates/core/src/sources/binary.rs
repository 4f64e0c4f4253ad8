use anyhow::Context;
use encoding_rs::{Encoding, EUC_KR, UTF_16LE, UTF_8};
use std::cmp::Reverse;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{is_hangul_syllable, passes_quality_gate, TextSource};

/// Decodes the head of an opaque file under a few likely encodings and keeps the one
/// that reads best as Korean text.
#[derive(Debug, Clone)]
pub struct BinarySniffer {
    pub max_bytes: usize,
}

impl Default for BinarySniffer {
    fn default() -> Self {
        Self { max_bytes: 50_000 }
    }
}

const CANDIDATES: &[&Encoding] = &[UTF_16LE, UTF_8, EUC_KR];

impl TextSource for BinarySniffer {
    fn name(&self) -> &'static str {
        "binary-sniffer"
    }

    fn read_text(&self, path: &Path) -> anyhow::Result<String> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut head = Vec::with_capacity(self.max_bytes);
        file.take(self.max_bytes as u64)
            .read_to_end(&mut head)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(sniff(&head).unwrap_or_default())
    }
}

/// Best decoding of `bytes` that passes the quality gate: fewest undecodable sequences
/// first, then most Hangul syllables. Control and replacement characters become spaces.
pub fn sniff(bytes: &[u8]) -> Option<String> {
    CANDIDATES
        .iter()
        .filter_map(|encoding| {
            let (decoded, _) = encoding.decode_without_bom_handling(bytes);
            let errors = decoded.chars().filter(|c| *c == '\u{FFFD}').count();
            let text: String = decoded
                .chars()
                .map(|c| {
                    if c == '\u{FFFD}' || (c.is_control() && c != '\n') {
                        ' '
                    } else {
                        c
                    }
                })
                .collect();
            let hangul = text.chars().filter(|c| is_hangul_syllable(*c)).count();
            passes_quality_gate(&text).then_some((errors, Reverse(hangul), text))
        })
        .min_by_key(|(errors, hangul, _)| (*errors, *hangul))
        .map(|(_, _, text)| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_euc_kr() {
        let (bytes, _, _) = EUC_KR.encode("2024학년도 2학기 기말고사 국어");
        assert_eq!(
            sniff(&bytes).as_deref(),
            Some("2024학년도 2학기 기말고사 국어")
        );
    }

    #[test]
    fn reads_utf16_file_head() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.hwp");
        let body: Vec<u8> = "생활기록부 세특 기재 요령"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        File::create(&path).unwrap().write_all(&body).unwrap();

        let text = BinarySniffer::default().read_text(&path).unwrap();
        assert_eq!(text, "생활기록부 세특 기재 요령");
    }

    #[test]
    fn noise_yields_nothing() {
        let bytes = b"\x00\x01\x02PK\x03\x04".repeat(500);
        assert_eq!(sniff(&bytes), None);
    }
}
