// Dump format auto-detection.
//
// Inspects one line of hex text and infers the format that produced it:
// offset prefix length (0, 10 or 19 characters), word width, and whether
// the digits are whitespace-separated or packed. Called once per stream on
// the first non-empty line; the result is then applied to every line,
// trusting only the prefix length (later prefixes are not re-validated).

use thiserror::Error;

use super::WordWidth;
use super::cells::{OFFSET32_PREFIX_CELLS, OFFSET64_PREFIX_CELLS};

/// The fixed dump format a stream of hex text was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseFormat {
    /// Characters to skip at the start of every line (offset prefix).
    pub prefix_chars: u32,
    /// Bytes per hex word.
    pub width: WordWidth,
    /// Digits are packed with no separators (raw binary-stream form).
    pub no_whitespace: bool,
}

/// Outcome of format detection.
///
/// Short lines can structurally match more than one format (for example a
/// lone 8-digit group reads as a 4-byte word or as packed single bytes).
/// The ambiguity is reported explicitly, but `chosen` always follows the
/// fixed priority order 4-byte > 2-byte > 1-byte > 8-byte > packed, for
/// compatibility with dumps produced by older tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Exactly one interpretation matched.
    Unique(ReverseFormat),
    /// Several interpretations matched; `chosen` is the highest-priority one.
    Ambiguous {
        chosen: ReverseFormat,
        candidates: usize,
    },
}

impl Detection {
    /// The format to decode with.
    pub fn format(&self) -> ReverseFormat {
        match *self {
            Self::Unique(fmt) => fmt,
            Self::Ambiguous { chosen, .. } => chosen,
        }
    }
}

/// The line does not match any known dump format.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("line does not match any known dump format")]
pub struct NotRecognized;

/// Infer the format that produced `line`.
///
/// `allow_no_whitespace` additionally admits the packed digit-stream form
/// used by raw binary decode.
pub fn detect(line: &str, allow_no_whitespace: bool) -> Result<Detection, NotRecognized> {
    let bytes = line.as_bytes();
    let prefix = sniff_prefix(bytes);
    let body = &bytes[prefix..];

    let mut first = None;
    let mut count = 0;
    let candidates = [
        (word_matches(body, WordWidth::Dword), WordWidth::Dword, false),
        (word_matches(body, WordWidth::Word), WordWidth::Word, false),
        (word_matches(body, WordWidth::Byte), WordWidth::Byte, false),
        (qword_matches(body), WordWidth::Qword, false),
        (
            allow_no_whitespace && leading_hex_run(body) >= 2,
            WordWidth::Byte,
            true,
        ),
    ];
    for (hit, width, packed) in candidates {
        if hit {
            first.get_or_insert(ReverseFormat {
                prefix_chars: prefix as u32,
                width,
                no_whitespace: packed,
            });
            count += 1;
        }
    }

    match (first, count) {
        (None, _) => Err(NotRecognized),
        (Some(fmt), 1) => Ok(Detection::Unique(fmt)),
        (Some(chosen), n) => Ok(Detection::Ambiguous {
            chosen,
            candidates: n,
        }),
    }
}

/// Offset prefix length in characters: 10 (32-bit), 19 (64-bit) or 0.
fn sniff_prefix(bytes: &[u8]) -> usize {
    if hex_run_at(bytes, 0, 8) && bytes.get(8) == Some(&b':') && bytes.get(9) == Some(&b' ') {
        return OFFSET32_PREFIX_CELLS;
    }
    if hex_run_at(bytes, 0, 8)
        && bytes.get(8) == Some(&b'`')
        && hex_run_at(bytes, 9, 8)
        && bytes.get(17) == Some(&b':')
        && bytes.get(18) == Some(&b' ')
    {
        return OFFSET64_PREFIX_CELLS;
    }
    0
}

/// A `2*width`-digit group followed by a space or end of line.
fn word_matches(body: &[u8], width: WordWidth) -> bool {
    let digits = width.digits();
    hex_run_at(body, 0, digits) && sep_or_end(body, digits)
}

/// The 64-bit half-half form: 8 digits, backtick, 8 digits.
fn qword_matches(body: &[u8]) -> bool {
    hex_run_at(body, 0, 8)
        && body.get(8) == Some(&b'`')
        && hex_run_at(body, 9, 8)
        && sep_or_end(body, 17)
}

fn hex_run_at(bytes: &[u8], start: usize, len: usize) -> bool {
    bytes.len() >= start + len && bytes[start..start + len].iter().all(u8::is_ascii_hexdigit)
}

fn sep_or_end(bytes: &[u8], at: usize) -> bool {
    match bytes.get(at) {
        None => true,
        Some(&b' ') => true,
        Some(_) => false,
    }
}

fn leading_hex_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_hexdigit()).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
