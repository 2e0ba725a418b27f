// Line rendering: binary → text.
//
// Renders one aligned chunk of up to 16 bytes into a display line. Word
// values are built by shifting bytes in from the last byte of the word to
// the first, so the least-addressed byte always renders as the rightmost
// digit pair regardless of host endianness. Absent bytes on a short final
// line render as blank cells, never digits.

use std::fmt::Write as _;

use super::style::{Style, StyledLine};
use super::{DumpFlags, HighlightMask, LINE_WIDTH, WordWidth};

/// Render `bytes` (≤ 16) as one display line.
///
/// `line_offset` is the logical stream offset of the first byte. `highlight`
/// emphasizes word groups and sidebar glyphs whose bytes are marked. `more`
/// is honored only in C-style mode, where it tells the encoder that stream
/// data follows this line and a trailing comma is needed.
pub fn encode_line(
    bytes: &[u8],
    line_offset: u64,
    width: WordWidth,
    flags: DumpFlags,
    highlight: Option<HighlightMask>,
    more: bool,
) -> StyledLine {
    debug_assert!(bytes.len() <= LINE_WIDTH);

    if flags.contains(DumpFlags::C_STYLE) {
        return encode_c_line(bytes, more);
    }

    let mut line = StyledLine::new();

    if flags.contains(DumpFlags::SHOW_OFFSET64) {
        line.push_str(
            &format!("{:08x}`{:08x}: ", line_offset >> 32, line_offset as u32),
            Style::Plain,
        );
    } else if flags.contains(DumpFlags::SHOW_OFFSET32) {
        line.push_str(&format!("{:08x}: ", line_offset as u32), Style::Plain);
    }

    let w = width.bytes();
    for k in 0..width.words_per_line() {
        let start = k * w;
        let word = &bytes[start.min(bytes.len())..(start + w).min(bytes.len())];
        line.push_str(&word_text(word, width), run_style(highlight, start, w));
        line.push_str(" ", Style::Plain);
    }

    let wide = flags.contains(DumpFlags::SHOW_WIDE_CHARS);
    if flags.contains(DumpFlags::SHOW_CHARS) || wide {
        line.push_str(" ", Style::Plain);
        if wide {
            for glyph in 0..LINE_WIDTH / 2 {
                let lo = glyph * 2;
                if lo >= bytes.len() {
                    line.push_char(' ', Style::Plain);
                    continue;
                }
                let hi = bytes.get(lo + 1).copied().unwrap_or(0);
                let unit = u16::from(bytes[lo]) | (u16::from(hi) << 8);
                line.push_char(wide_glyph(unit), run_style(highlight, lo, 2));
            }
        } else {
            for (i, &b) in bytes.iter().enumerate() {
                line.push_char(byte_glyph(b), run_style(highlight, i, 1));
            }
            for _ in bytes.len()..LINE_WIDTH {
                line.push_char(' ', Style::Plain);
            }
        }
    }

    line
}

/// C array initializer form: 8 leading spaces, comma-separated byte values,
/// trailing comma only when more stream data follows.
fn encode_c_line(bytes: &[u8], more: bool) -> StyledLine {
    let mut text = String::from("        ");
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        let _ = write!(text, "{b:02x}");
    }
    if more {
        text.push(',');
    }
    let mut line = StyledLine::new();
    line.push_str(&text, Style::Plain);
    line
}

/// Digit cells of one word, least-addressed byte rendered last; absent
/// bytes become blank cells. Fully absent words are all blanks.
fn word_text(word: &[u8], width: WordWidth) -> String {
    let w = width.bytes();
    let mut text = String::with_capacity(width.cells_per_word());
    if word.is_empty() {
        for _ in 0..width.digits() + usize::from(width == WordWidth::Qword) {
            text.push(' ');
        }
        return text;
    }
    for pair in 0..w {
        if width == WordWidth::Qword && pair == 4 {
            text.push('`');
        }
        match word.get(w - 1 - pair) {
            Some(b) => {
                let _ = write!(text, "{b:02x}");
            }
            None => text.push_str("  "),
        }
    }
    text
}

fn run_style(highlight: Option<HighlightMask>, start: usize, len: usize) -> Style {
    match highlight {
        Some(mask) if (start..(start + len).min(LINE_WIDTH)).any(|p| mask.get(p)) => {
            Style::Emphasis
        }
        _ => Style::Plain,
    }
}

fn byte_glyph(b: u8) -> char {
    if (0x20..=0x7e).contains(&b) {
        b as char
    } else {
        '.'
    }
}

fn wide_glyph(unit: u16) -> char {
    if unit < 0x20 {
        return '.';
    }
    match char::from_u32(u32::from(unit)) {
        Some(c) if !c.is_control() => c,
        _ => '.',
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
