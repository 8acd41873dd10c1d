//! Text normalization with offset-preserving index mapping
//!
//! Canonicalizes raw document text (Unicode NFKC, whitespace variants,
//! de-obfuscated email addresses, trunk-zero phone prefixes) while keeping a
//! byte-accurate map from every normalized position back to the original
//! text. Downstream detectors run on the normalized form; the final pipeline
//! pass uses [`NormalizationResult::map_span`] to translate entity spans back
//! into the caller's coordinate space.

use regex::Regex;
use unicode_normalization::char::compose;
use unicode_normalization::UnicodeNormalization;

/// Zero-width characters removed outright (U+200B..D, BOM)
const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Non-breaking space variants collapsed to a plain space
const NBSP_VARIANTS: [char; 3] = ['\u{00A0}', '\u{202F}', '\u{2007}'];

/// Bare obfuscation words are only rewritten into `.` when a rewritten `@`
/// sits within this many bytes, so prose like "un point important" survives.
const DOT_PROXIMITY: usize = 80;

/// Normalized text plus the map back to original byte offsets
///
/// `index_map` holds one entry per byte of `normalized_text`; the value is
/// the byte offset of the original character that produced it. Entries are
/// non-decreasing. De-obfuscation rewrites point every replacement byte at
/// the start of the consumed original span, so mapping stays a valid, if
/// coarse, superset for rewritten regions.
#[derive(Debug, Clone)]
pub struct NormalizationResult {
    /// The canonicalized text detectors operate on
    pub normalized_text: String,
    /// Per-byte map into the original text
    pub index_map: Vec<usize>,
    /// Per-byte length of the consumed original span, used to close spans
    src_len: Vec<usize>,
}

impl NormalizationResult {
    /// Empty result for empty input
    pub fn empty() -> Self {
        Self {
            normalized_text: String::new(),
            index_map: Vec::new(),
            src_len: Vec::new(),
        }
    }

    /// Translate a normalized byte span `[start, end)` into original-text
    /// coordinates
    ///
    /// The returned span fully contains the original characters that produced
    /// the normalized span. Out-of-range inputs clamp to the text bounds; an
    /// empty or inverted span collapses to an empty span at its anchor.
    pub fn map_span(&self, start: usize, end: usize) -> (usize, usize) {
        let len = self.index_map.len();
        if len == 0 {
            return (0, 0);
        }
        let start = start.min(len);
        let end = end.min(len);
        if start >= end {
            let anchor = self.index_map[start.min(len - 1)];
            return (anchor, anchor);
        }
        let orig_start = self.index_map[start];
        let last = end - 1;
        let orig_end = self.index_map[last] + self.src_len[last];
        (orig_start, orig_end.max(orig_start))
    }

    /// Length in bytes of the normalized text
    pub fn len(&self) -> usize {
        self.normalized_text.len()
    }

    /// True when the normalized text is empty
    pub fn is_empty(&self) -> bool {
        self.normalized_text.is_empty()
    }
}

/// A single normalized character and the original span it came from
#[derive(Debug, Clone, Copy)]
struct MappedChar {
    ch: char,
    src_start: usize,
    src_len: usize,
}

/// A planned rewrite of the intermediate text, byte-addressed
///
/// `replacement == None` deletes the span (trunk-zero stripping).
#[derive(Debug, Clone, Copy)]
struct Rewrite {
    start: usize,
    end: usize,
    replacement: Option<char>,
}

/// Offset-preserving text normalizer
///
/// Stateless apart from its compiled marker patterns; one instance serves
/// any number of documents.
pub struct TextNormalizer {
    at_paren: Regex,
    at_bare: Regex,
    dot_paren: Regex,
    dot_bare: Regex,
    trunk_zero: Regex,
}

impl TextNormalizer {
    /// Build a normalizer with the standard EN/FR/DE obfuscation markers
    pub fn new() -> Self {
        Self {
            at_paren: Regex::new(r"(?i)[(\[]\s*(?:at|arobase|klammeraffe)\s*[)\]]").unwrap(),
            at_bare: Regex::new(r"(?i)\b(?:arobase|klammeraffe)\b").unwrap(),
            dot_paren: Regex::new(r"(?i)[(\[]\s*(?:dot|point|punkt)\s*[)\]]").unwrap(),
            dot_bare: Regex::new(r"(?i)\b(?:dot|point|punkt)\b").unwrap(),
            trunk_zero: Regex::new(r"\(0\)").unwrap(),
        }
    }

    /// Normalize `text`, producing the canonical form and its index map
    ///
    /// Steps, in order: NFKC with composition of combining sequences,
    /// zero-width removal, NBSP collapsing, email de-obfuscation
    /// (`(at)`/`(dot)`, French `arobase`/`point`, German
    /// `Klammeraffe`/`Punkt`), and trunk-zero stripping for phone numbers.
    /// Separator styles inside phone numbers are left alone; the detection
    /// patterns tolerate them directly.
    ///
    /// Empty input returns an empty result. This method does not fail.
    pub fn normalize(&self, text: &str) -> NormalizationResult {
        if text.is_empty() {
            return NormalizationResult::empty();
        }

        let composed = self.unicode_pass(text);
        let rewritten = self.rewrite_pass(composed);

        let mut normalized_text = String::with_capacity(text.len());
        let mut index_map = Vec::with_capacity(text.len());
        let mut src_len = Vec::with_capacity(text.len());
        for mc in rewritten {
            for _ in 0..mc.ch.len_utf8() {
                index_map.push(mc.src_start);
                src_len.push(mc.src_len);
            }
            normalized_text.push(mc.ch);
        }

        NormalizationResult {
            normalized_text,
            index_map,
            src_len,
        }
    }

    /// NFKC per source character, then pairwise canonical composition so
    /// decomposed sequences (`u` + U+0308) collapse to one mapped character
    /// spanning both originals.
    fn unicode_pass(&self, text: &str) -> Vec<MappedChar> {
        let mut mapped: Vec<MappedChar> = Vec::with_capacity(text.len());
        for (offset, ch) in text.char_indices() {
            let src_len = ch.len_utf8();
            if ZERO_WIDTH.contains(&ch) {
                continue;
            }
            if NBSP_VARIANTS.contains(&ch) {
                mapped.push(MappedChar {
                    ch: ' ',
                    src_start: offset,
                    src_len,
                });
                continue;
            }
            for out in std::iter::once(ch).nfkc() {
                mapped.push(MappedChar {
                    ch: out,
                    src_start: offset,
                    src_len,
                });
            }
        }

        let mut composed: Vec<MappedChar> = Vec::with_capacity(mapped.len());
        for mc in mapped {
            if let Some(prev) = composed.last_mut() {
                if let Some(merged) = compose(prev.ch, mc.ch) {
                    let span_end = mc.src_start + mc.src_len;
                    prev.ch = merged;
                    prev.src_len = span_end.saturating_sub(prev.src_start);
                    continue;
                }
            }
            composed.push(mc);
        }
        composed
    }

    /// Apply de-obfuscation and trunk-zero rewrites to the mapped characters
    fn rewrite_pass(&self, chars: Vec<MappedChar>) -> Vec<MappedChar> {
        let mut inter = String::with_capacity(chars.len());
        let mut char_at_byte = Vec::with_capacity(chars.len());
        for (idx, mc) in chars.iter().enumerate() {
            for _ in 0..mc.ch.len_utf8() {
                char_at_byte.push(idx);
            }
            inter.push(mc.ch);
        }

        let rewrites = self.plan_rewrites(&inter);
        if rewrites.is_empty() {
            return chars;
        }

        let mut out: Vec<MappedChar> = Vec::with_capacity(chars.len());
        let mut rewrite_iter = rewrites.iter().peekable();
        let mut byte = 0usize;
        while byte < inter.len() {
            let idx = char_at_byte[byte];
            let mc = chars[idx];
            if let Some(rw) = rewrite_iter.peek() {
                if rw.start == byte {
                    let first = chars[char_at_byte[rw.start]];
                    let last = chars[char_at_byte[rw.end - 1]];
                    if let Some(ch) = rw.replacement {
                        out.push(MappedChar {
                            ch,
                            src_start: first.src_start,
                            src_len: (last.src_start + last.src_len)
                                .saturating_sub(first.src_start),
                        });
                    }
                    byte = rw.end;
                    rewrite_iter.next();
                    continue;
                }
            }
            out.push(mc);
            byte += mc.ch.len_utf8();
        }
        out
    }

    /// Find all rewrite spans in the intermediate text, sorted and
    /// non-overlapping
    fn plan_rewrites(&self, inter: &str) -> Vec<Rewrite> {
        let bytes = inter.as_bytes();
        let mut rewrites: Vec<Rewrite> = Vec::new();
        let mut at_spans: Vec<(usize, usize)> = Vec::new();

        for m in self
            .at_paren
            .find_iter(inter)
            .chain(self.at_bare.find_iter(inter))
        {
            if let Some(span) = accept_marker(bytes, m.start(), m.end(), is_local_part_byte) {
                at_spans.push(span);
                rewrites.push(Rewrite {
                    start: span.0,
                    end: span.1,
                    replacement: Some('@'),
                });
            }
        }

        for m in self.dot_paren.find_iter(inter) {
            if let Some(span) = accept_marker(bytes, m.start(), m.end(), is_alnum_byte) {
                rewrites.push(Rewrite {
                    start: span.0,
                    end: span.1,
                    replacement: Some('.'),
                });
            }
        }

        for m in self.dot_bare.find_iter(inter) {
            let near_at = at_spans
                .iter()
                .any(|(s, _)| m.start().abs_diff(*s) <= DOT_PROXIMITY);
            if !near_at {
                continue;
            }
            if let Some(span) = accept_marker(bytes, m.start(), m.end(), is_alnum_byte) {
                rewrites.push(Rewrite {
                    start: span.0,
                    end: span.1,
                    replacement: Some('.'),
                });
            }
        }

        for m in self.trunk_zero.find_iter(inter) {
            if !digit_precedes(bytes, m.start()) {
                continue;
            }
            // consume one trailing space so "+41 (0) 44" tightens to "+41 44"
            let mut end = m.end();
            if bytes.get(end) == Some(&b' ') && m.start() > 0 && bytes[m.start() - 1] == b' ' {
                end += 1;
            }
            rewrites.push(Rewrite {
                start: m.start(),
                end,
                replacement: None,
            });
        }

        rewrites.sort_by_key(|r| (r.start, r.end));
        rewrites.dedup_by_key(|r| r.start);
        let mut filtered: Vec<Rewrite> = Vec::with_capacity(rewrites.len());
        for rw in rewrites {
            if filtered.last().is_none_or(|prev| prev.end <= rw.start) {
                filtered.push(rw);
            }
        }
        filtered
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a marker's neighbors and extend its span over flanking spaces
///
/// The left neighbor (skipping spaces) must satisfy `left_ok`; the right
/// neighbor must be alphanumeric. Returns the extended byte span.
fn accept_marker(
    bytes: &[u8],
    start: usize,
    end: usize,
    left_ok: fn(u8) -> bool,
) -> Option<(usize, usize)> {
    let mut s = start;
    while s > 0 && bytes[s - 1] == b' ' {
        s -= 1;
    }
    let mut e = end;
    while e < bytes.len() && bytes[e] == b' ' {
        e += 1;
    }
    if s == 0 || e >= bytes.len() {
        return None;
    }
    if !left_ok(bytes[s - 1]) || !bytes[e].is_ascii_alphanumeric() {
        return None;
    }
    Some((s, e))
}

fn is_local_part_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'%' | b'+' | b'-')
}

fn is_alnum_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

/// True when the nearest non-space byte before `pos` is an ASCII digit
fn digit_precedes(bytes: &[u8], pos: usize) -> bool {
    let mut i = pos;
    while i > 0 && bytes[i - 1] == b' ' {
        i -= 1;
    }
    i > 0 && bytes[i - 1].is_ascii_digit()
}
