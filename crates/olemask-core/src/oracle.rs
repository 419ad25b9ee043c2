use std::ops::Range;

use serde::Serialize;

/// A sensitive character range reported by a [`SensitivityOracle`].
///
/// `start..end` is a half-open range of `char` offsets into the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensitiveSpan {
    pub start: usize,
    pub end: usize,
    pub matched: String,
    pub rule: String,
}

/// Normalized text plus the bridge back to raw character positions.
///
/// `index_map[i]` is the raw `char` index that normalized character `i` came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub index_map: Vec<usize>,
}

impl NormalizedText {
    pub fn identity(raw: &str) -> Self {
        let len = raw.chars().count();
        Self {
            text: raw.to_string(),
            index_map: (0..len).collect(),
        }
    }

    /// Map a normalized `start..end` back to raw character positions. The raw range runs from
    /// the first mapped character to one past the last, so characters the normalizer dropped
    /// inside the span are covered too.
    pub fn raw_range(&self, start: usize, end: usize, raw_len: usize) -> Option<Range<usize>> {
        if start >= end {
            return None;
        }
        let raw_start = *self.index_map.get(start)?;
        let raw_last = *self.index_map.get(end - 1)?;
        let raw_end = raw_last.checked_add(1)?;
        (raw_start < raw_end && raw_end <= raw_len).then_some(raw_start..raw_end)
    }
}

/// The PII-matching collaborator.
///
/// Implementations decide what is sensitive; the codecs only need exact character offsets.
pub trait SensitivityOracle {
    fn find_sensitive_spans(&self, normalized: &str) -> Vec<SensitiveSpan>;

    fn normalize(&self, raw: &str) -> NormalizedText {
        NormalizedText::identity(raw)
    }
}

/// Matches fixed strings. Overlapping needles resolve leftmost-longest.
#[derive(Debug, Clone, Default)]
pub struct LiteralOracle {
    needles: Vec<Vec<char>>,
}

impl LiteralOracle {
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut needles: Vec<Vec<char>> = needles
            .into_iter()
            .map(|s| s.as_ref().chars().collect::<Vec<_>>())
            .filter(|chars| !chars.is_empty())
            .collect();
        needles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        needles.dedup();
        Self { needles }
    }

    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }
}

impl SensitivityOracle for LiteralOracle {
    fn find_sensitive_spans(&self, normalized: &str) -> Vec<SensitiveSpan> {
        let haystack: Vec<char> = normalized.chars().collect();
        let mut out = Vec::new();
        let mut pos = 0usize;
        while pos < haystack.len() {
            let hit = self
                .needles
                .iter()
                .find(|needle| haystack[pos..].starts_with(needle.as_slice()));
            match hit {
                Some(needle) => {
                    out.push(SensitiveSpan {
                        start: pos,
                        end: pos + needle.len(),
                        matched: needle.iter().collect(),
                        rule: "literal".to_string(),
                    });
                    pos += needle.len();
                }
                None => pos += 1,
            }
        }
        out
    }
}

/// A sensitive range in raw (pre-normalization) character positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpan {
    pub range: Range<usize>,
    pub rule: String,
}

/// Run the oracle over `raw` and return the hits in raw character positions.
///
/// A hit that crosses a paragraph gap (two or more consecutive CR/LF characters) is split so the
/// gap itself is never masked.
pub fn locate_raw_spans(oracle: &dyn SensitivityOracle, raw: &str) -> Vec<RawSpan> {
    if raw.is_empty() {
        return Vec::new();
    }
    let raw_chars: Vec<char> = raw.chars().collect();
    let normalized = oracle.normalize(raw);

    let mut out = Vec::new();
    for span in oracle.find_sensitive_spans(&normalized.text) {
        let Some(range) = normalized.raw_range(span.start, span.end, raw_chars.len()) else {
            log::debug!(
                "dropping {} hit {}..{} that does not map back to raw text",
                span.rule,
                span.start,
                span.end
            );
            continue;
        };
        for piece in split_on_paragraph_gaps(&raw_chars, range) {
            out.push(RawSpan {
                range: piece,
                rule: span.rule.clone(),
            });
        }
    }
    out.sort_by_key(|span| (span.range.start, span.range.end));
    out
}

fn split_on_paragraph_gaps(chars: &[char], range: Range<usize>) -> Vec<Range<usize>> {
    let is_break = |c: char| c == '\r' || c == '\n';

    let mut out = Vec::new();
    let mut piece_start = range.start;
    let mut i = range.start;
    while i < range.end {
        if !is_break(chars[i]) {
            i += 1;
            continue;
        }
        let gap_start = i;
        while i < range.end && is_break(chars[i]) {
            i += 1;
        }
        if i - gap_start >= 2 {
            if piece_start < gap_start {
                out.push(piece_start..gap_start);
            }
            piece_start = i;
        }
    }
    if piece_start < range.end {
        out.push(piece_start..range.end);
    }
    out
}
