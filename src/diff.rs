// Side-by-side binary differencing.
//
// Reads two streams in lock-step, 16 bytes per side per iteration, and
// renders a highlighted line pair for every position where the sides
// disagree. Alignment is strictly positional; this is not an edit-distance
// diff.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use thiserror::Error;

use crate::dump::encoder::encode_line;
use crate::dump::style::{Style, StyledLine};
use crate::dump::{DumpFlags, FlagsError, HighlightMask, LINE_WIDTH, WordWidth};

/// Error type for diff mode.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("invalid dump flags: {0}")]
    Flags(#[from] FlagsError),
    #[error("C-style output cannot be combined with diff mode")]
    CStyle,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Options for diff mode.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub width: WordWidth,
    pub flags: DumpFlags,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            width: WordWidth::Byte,
            flags: DumpFlags::standard(),
        }
    }
}

/// Statistics returned by diff mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffStats {
    pub bytes_a: u64,
    pub bytes_b: u64,
    /// Logical line pairs examined.
    pub lines: u64,
    /// Line pairs rendered (at least one highlighted byte).
    pub differing: u64,
    pub cancelled: bool,
}

/// Compute the highlight mask for one line pair.
///
/// A position is highlighted when either side lacks it or the sides
/// disagree; positions past both sides are not part of the line.
fn highlight_for(a: &[u8], b: &[u8]) -> HighlightMask {
    let mut mask = HighlightMask::empty();
    for p in 0..a.len().max(b.len()) {
        if p >= a.len() || p >= b.len() || a[p] != b[p] {
            mask.set(p);
        }
    }
    mask
}

/// Fill up to one line's worth of bytes, looping over short reads so that
/// differing source granularities cannot skew alignment.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8; LINE_WIDTH]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Render every differing line pair of two streams.
///
/// Side A carries the offset prefix (when enabled); side B does not repeat
/// it. Output uses ANSI SGR emphasis around the differing bytes.
pub fn diff_streams<A: Read, B: Read, W: Write>(
    a: &mut A,
    b: &mut B,
    mut writer: W,
    opts: &DiffOptions,
    cancel: Option<&AtomicBool>,
) -> Result<DiffStats, DiffError> {
    opts.flags.validate()?;
    if opts.flags.contains(DumpFlags::C_STYLE) {
        return Err(DiffError::CStyle);
    }
    let side_b_flags = opts.flags - (DumpFlags::SHOW_OFFSET32 | DumpFlags::SHOW_OFFSET64);

    let mut stats = DiffStats::default();
    let mut offset = 0u64;
    let mut chunk_a = [0u8; LINE_WIDTH];
    let mut chunk_b = [0u8; LINE_WIDTH];

    loop {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            stats.cancelled = true;
            break;
        }
        let na = read_chunk(a, &mut chunk_a)?;
        let nb = read_chunk(b, &mut chunk_b)?;
        if na == 0 && nb == 0 {
            break;
        }
        stats.bytes_a += na as u64;
        stats.bytes_b += nb as u64;
        stats.lines += 1;

        let mask = highlight_for(&chunk_a[..na], &chunk_b[..nb]);
        if mask.any() {
            let mut pair = encode_line(
                &chunk_a[..na],
                offset,
                opts.width,
                opts.flags,
                Some(mask),
                false,
            );
            pair.push_str(" | ", Style::Plain);
            pair.append(encode_line(
                &chunk_b[..nb],
                offset,
                opts.width,
                side_b_flags,
                Some(mask),
                false,
            ));
            write_rendered(&mut writer, &pair)?;
            stats.differing += 1;
        }
        offset += LINE_WIDTH as u64;
    }

    writer.flush()?;
    debug!(
        "diff: {} lines examined, {} differ",
        stats.lines, stats.differing
    );
    Ok(stats)
}

fn write_rendered<W: Write>(writer: &mut W, line: &StyledLine) -> io::Result<()> {
    let text = line.to_ansi();
    writer.write_all(text.trim_end_matches(' ').as_bytes())?;
    writer.write_all(b"\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn diff_to_string(a: &[u8], b: &[u8], opts: &DiffOptions) -> (String, DiffStats) {
        let mut out = Vec::new();
        let stats = diff_streams(&mut &a[..], &mut &b[..], &mut out, opts, None).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn highlight_marks_exact_differing_byte() {
        let mask = highlight_for(&[0x00, 0x01, 0x02], &[0x00, 0xFF, 0x02]);
        assert!(!mask.get(0));
        assert!(mask.get(1));
        assert!(!mask.get(2));
        assert!(!mask.get(3));
    }

    #[test]
    fn highlight_marks_length_mismatch() {
        let mask = highlight_for(&[0x00, 0x01], &[0x00, 0x01, 0x02]);
        assert!(!mask.get(0));
        assert!(!mask.get(1));
        assert!(mask.get(2));
        assert!(!mask.get(3));
    }

    #[test]
    fn identical_streams_render_nothing() {
        let data: Vec<u8> = (0..100).collect();
        let (text, stats) = diff_to_string(&data, &data, &DiffOptions::default());
        assert!(text.is_empty());
        assert_eq!(stats.lines, 7);
        assert_eq!(stats.differing, 0);
    }

    #[test]
    fn differing_line_renders_both_sides_once() {
        let a: Vec<u8> = (0..32).collect();
        let mut b = a.clone();
        b[20] ^= 0xFF;
        let (text, stats) = diff_to_string(&a, &b, &DiffOptions::default());
        assert_eq!(stats.differing, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        // Offset prefix on side A only, joined by the column marker.
        assert!(lines[0].starts_with("00000010: "));
        assert!(lines[0].contains("| "));
        assert_eq!(lines[0].matches(": ").count(), 1);
    }

    #[test]
    fn differing_byte_is_emphasized() {
        let a = [0x00u8, 0x01, 0x02];
        let b = [0x00u8, 0xFF, 0x02];
        let opts = DiffOptions {
            flags: DumpFlags::empty(),
            ..Default::default()
        };
        let (text, _) = diff_to_string(&a, &b, &opts);
        assert!(text.contains("\x1b[0;1m01\x1b[0m"));
        assert!(text.contains("\x1b[0;1mff\x1b[0m"));
    }

    #[test]
    fn shorter_side_contributes_padding() {
        let a = [0x41u8, 0x42];
        let b = [0x41u8, 0x42, 0x43];
        let (text, stats) = diff_to_string(&a, &b, &DiffOptions::default());
        assert_eq!(stats.differing, 1);
        assert_eq!(stats.bytes_a, 2);
        assert_eq!(stats.bytes_b, 3);
        // Side B shows the extra byte; side A pads it as absent.
        assert!(text.contains("43"));
    }

    #[test]
    fn terminates_when_both_sides_exhaust() {
        let a = [0u8; 16];
        let b = [0u8; 48];
        let (_, stats) = diff_to_string(&a, &b, &DiffOptions::default());
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.differing, 2);
    }

    #[test]
    fn c_style_is_rejected() {
        let mut out = Vec::new();
        let opts = DiffOptions {
            flags: DumpFlags::C_STYLE,
            ..Default::default()
        };
        let err = diff_streams(&mut &b""[..], &mut &b""[..], &mut out, &opts, None)
            .unwrap_err();
        assert!(matches!(err, DiffError::CStyle));
    }

    #[test]
    fn cancel_stops_cleanly() {
        let flag = AtomicBool::new(true);
        let a = [0u8; 64];
        let b = [1u8; 64];
        let mut out = Vec::new();
        let stats =
            diff_streams(&mut &a[..], &mut &b[..], &mut out, &DiffOptions::default(), Some(&flag))
                .unwrap();
        assert!(stats.cancelled);
        assert!(out.is_empty());
    }
}
