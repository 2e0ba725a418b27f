// Line parsing: text → binary.
//
// Parses one line of hex text under a previously-sniffed format. Words are
// walked at a fixed stride; the offset prefix is skipped by length only.
// Blank cells at the head of a group are padding for absent high-order
// bytes (short final lines), so a partial group decodes back to exactly
// the bytes that produced it.

use thiserror::Error;

use super::sniffer::ReverseFormat;
use super::{BufferError, LineBuffer, WordWidth};

/// Why a line failed to parse.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("invalid hex digit")]
    InvalidDigit,
    #[error("truncated hex word")]
    InsufficientDigits,
}

/// A line-level decode failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LineFault {
    /// Malformed text; `column` is the character index of the fault (for a
    /// truncated word, the index where the missing digit would be).
    #[error("{kind} at column {column}")]
    Parse { kind: ParseErrorKind, column: usize },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

fn parse_fault(kind: ParseErrorKind, column: usize) -> LineFault {
    LineFault::Parse { kind, column }
}

/// Parse one line into `out`, returning the number of bytes appended.
///
/// Trailing whitespace is trimmed first. Parsing stops cleanly when the
/// line runs out of characters at a word boundary; on failure `out` keeps
/// the whole words decoded before the fault.
pub fn decode_line(
    line: &str,
    fmt: &ReverseFormat,
    out: &mut LineBuffer,
) -> Result<usize, LineFault> {
    let bytes = line.trim_end_matches([' ', '\t', '\r', '\n']).as_bytes();
    let before = out.len();
    let prefix = fmt.prefix_chars as usize;
    if bytes.len() <= prefix {
        return Ok(0);
    }
    if fmt.no_whitespace {
        decode_packed(bytes, prefix, out)?;
    } else {
        decode_words(bytes, prefix, fmt.width, out)?;
    }
    Ok(out.len() - before)
}

/// Packed digit-stream form: consecutive hex digit pairs, no separators.
fn decode_packed(bytes: &[u8], start: usize, out: &mut LineBuffer) -> Result<(), LineFault> {
    let mut pos = start;
    while pos < bytes.len() {
        let hi =
            hex_val(bytes[pos]).ok_or(parse_fault(ParseErrorKind::InvalidDigit, pos))?;
        if pos + 1 >= bytes.len() {
            return Err(parse_fault(ParseErrorKind::InsufficientDigits, bytes.len()));
        }
        let lo = hex_val(bytes[pos + 1])
            .ok_or(parse_fault(ParseErrorKind::InvalidDigit, pos + 1))?;
        out.push(hi << 4 | lo)?;
        pos += 2;
    }
    Ok(())
}

/// Whitespace-separated word form at fixed stride.
fn decode_words(
    bytes: &[u8],
    prefix: usize,
    width: WordWidth,
    out: &mut LineBuffer,
) -> Result<(), LineFault> {
    let stride = width.cells_per_word();
    for word in 0..width.words_per_line() {
        let base = prefix + word * stride;
        if base >= bytes.len() {
            break;
        }

        let mut val: u64 = 0;
        let mut ndigits = 0usize;
        let mut padded = false;
        let mut ended_early = false;
        for d in 0..width.digits() {
            // The qword backtick cell sits between digit cells 7 and 8 and
            // is skipped without validation, like word separators.
            let col = base + d + usize::from(width == WordWidth::Qword && d >= 8);
            let Some(&c) = bytes.get(col) else {
                ended_early = true;
                break;
            };
            if c == b' ' {
                if ndigits == 0 {
                    padded = true;
                    continue;
                }
                return Err(parse_fault(ParseErrorKind::InvalidDigit, col));
            }
            match hex_val(c) {
                Some(v) => {
                    val = val << 4 | u64::from(v);
                    ndigits += 1;
                }
                None => return Err(parse_fault(ParseErrorKind::InvalidDigit, col)),
            }
        }

        if ndigits % 2 != 0 || (ended_early && !padded && ndigits < width.digits()) {
            return Err(parse_fault(ParseErrorKind::InsufficientDigits, bytes.len()));
        }
        // Digit pairs ran most-significant first; append storage order,
        // least-addressed byte first.
        for i in 0..ndigits / 2 {
            out.push((val >> (8 * i)) as u8)?;
        }
    }
    Ok(())
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
