// Hex dump line codec.
//
// This module holds the pure, line-level half of the codec: everything that
// maps 16-byte chunks to display lines and back, with no I/O.
//
// # Modules
//
// - `cells`   — (byte offset, nibble) ↔ (display column) addressing
// - `style`   — styled-run line accumulator (plain / emphasized spans)
// - `encoder` — binary → text rendering for one line
// - `sniffer` — dump format auto-detection from one line of text
// - `decoder` — text → binary parsing for one line

pub mod cells;
pub mod decoder;
pub mod encoder;
pub mod sniffer;
pub mod style;

// Re-export key types for convenience.
pub use decoder::{LineFault, ParseErrorKind, decode_line};
pub use encoder::encode_line;
pub use sniffer::{Detection, NotRecognized, ReverseFormat, detect};
pub use style::{Style, StyledLine};

use thiserror::Error;

/// Number of bytes rendered per display line.
pub const LINE_WIDTH: usize = 16;

// ---------------------------------------------------------------------------
// Word width
// ---------------------------------------------------------------------------

/// Number of bytes grouped and rendered as one hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordWidth {
    /// 1-byte groups (`xx`).
    Byte,
    /// 2-byte groups (`xxxx`).
    Word,
    /// 4-byte groups (`xxxxxxxx`).
    Dword,
    /// 8-byte groups rendered as two 32-bit halves (`xxxxxxxx`` ` ``xxxxxxxx`).
    Qword,
}

impl WordWidth {
    /// All widths, in increasing byte count.
    pub const ALL: [WordWidth; 4] = [Self::Byte, Self::Word, Self::Dword, Self::Qword];

    /// Bytes per displayed word.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Dword => 4,
            Self::Qword => 8,
        }
    }

    /// Hex digits per displayed word.
    #[inline]
    pub const fn digits(self) -> usize {
        2 * self.bytes()
    }

    /// Display cells per word including its trailing separator cell.
    ///
    /// Qword groups carry one extra cell for the internal backtick that
    /// joins the two 32-bit halves.
    #[inline]
    pub const fn cells_per_word(self) -> usize {
        match self {
            Self::Qword => 2 * 8 + 2,
            w => 2 * w.bytes() + 1,
        }
    }

    /// Words per 16-byte display line.
    #[inline]
    pub const fn words_per_line(self) -> usize {
        LINE_WIDTH / self.bytes()
    }

    /// Map a byte count (1/2/4/8) to a width.
    pub const fn from_bytes(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::Byte),
            2 => Some(Self::Word),
            4 => Some(Self::Dword),
            8 => Some(Self::Qword),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dump flags
// ---------------------------------------------------------------------------

bitflags::bitflags! {
    /// Display options for rendered dump lines.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DumpFlags: u8 {
        /// Prefix each line with a 32-bit offset (`%08x: `).
        const SHOW_OFFSET32 = 1 << 0;
        /// Prefix each line with a 64-bit two-half offset (`%08x`` ` ``%08x: `).
        const SHOW_OFFSET64 = 1 << 1;
        /// Append a one-glyph-per-byte character sidebar.
        const SHOW_CHARS = 1 << 2;
        /// Append a one-glyph-per-two-bytes (UTF-16) character sidebar.
        const SHOW_WIDE_CHARS = 1 << 3;
        /// Emit C array initializer syntax; all other flags are ignored.
        const C_STYLE = 1 << 4;
    }
}

/// Invalid flag combination.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FlagsError {
    #[error("32-bit and 64-bit offset prefixes are mutually exclusive")]
    ConflictingOffsets,
    #[error("narrow and wide character sidebars are mutually exclusive")]
    ConflictingChars,
}

impl DumpFlags {
    /// Check the mutual-exclusion invariants.
    pub fn validate(self) -> Result<(), FlagsError> {
        if self.contains(Self::SHOW_OFFSET32 | Self::SHOW_OFFSET64) {
            return Err(FlagsError::ConflictingOffsets);
        }
        if self.contains(Self::SHOW_CHARS | Self::SHOW_WIDE_CHARS) {
            return Err(FlagsError::ConflictingChars);
        }
        Ok(())
    }

    /// Default display shape: 32-bit offsets plus the character sidebar.
    pub const fn standard() -> Self {
        Self::SHOW_OFFSET32.union(Self::SHOW_CHARS)
    }
}

// ---------------------------------------------------------------------------
// Highlight mask
// ---------------------------------------------------------------------------

/// Per-byte highlight flags for one display line, used in diff mode.
///
/// Storage keeps the wire rule (bit 0 = last byte of the line); callers use
/// the positional accessors and never see the bit numbering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightMask(u16);

impl HighlightMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Mark byte position `p` (0 = first byte of the line) as highlighted.
    #[inline]
    pub fn set(&mut self, p: usize) {
        debug_assert!(p < LINE_WIDTH);
        self.0 |= 1 << (LINE_WIDTH - 1 - p);
    }

    /// Whether byte position `p` is highlighted.
    #[inline]
    pub const fn get(self, p: usize) -> bool {
        self.0 & (1 << (LINE_WIDTH - 1 - p)) != 0
    }

    /// Whether any position is highlighted.
    #[inline]
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// Raw mask bits (bit 0 = last byte).
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Line buffer
// ---------------------------------------------------------------------------

/// Growth floor for the unbounded decode buffer.
const GROWTH_FLOOR: usize = 2 * 1024;

/// Geometric growth factor.
const GROWTH_FACTOR: usize = 4;

/// Hard ceiling: the platform's maximum single allocation.
const ALLOC_CEILING: usize = isize::MAX as usize;

/// Line buffer overflow / growth failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("decoded line exceeds the {capacity}-byte line capacity")]
    LineOverflow { capacity: usize },
    #[error("line buffer growth exceeds the allocation limit of {limit} bytes")]
    AllocationLimitExceeded { limit: usize },
}

/// Accumulator for one decoded line's bytes.
///
/// Structured decode modes use a fixed 16-byte capacity; raw binary decode
/// grows geometrically (×4, 2 KiB floor) up to [`ALLOC_CEILING`] because a
/// single physical line may encode arbitrarily many bytes. The buffer is
/// cleared, not reallocated, between lines.
#[derive(Debug)]
pub struct LineBuffer {
    data: Vec<u8>,
    limit: usize,
    grow: bool,
}

impl LineBuffer {
    /// Fixed-capacity buffer; `push` past `capacity` bytes fails.
    pub fn fixed(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            limit: capacity,
            grow: false,
        }
    }

    /// Unbounded buffer with geometric growth.
    pub fn growable() -> Self {
        Self {
            data: Vec::new(),
            limit: ALLOC_CEILING,
            grow: true,
        }
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) -> Result<(), BufferError> {
        if self.data.len() >= self.limit {
            return Err(if self.grow {
                BufferError::AllocationLimitExceeded { limit: self.limit }
            } else {
                BufferError::LineOverflow {
                    capacity: self.limit,
                }
            });
        }
        if self.grow && self.data.len() == self.data.capacity() {
            let want = self
                .data
                .capacity()
                .saturating_mul(GROWTH_FACTOR)
                .clamp(GROWTH_FLOOR, self.limit);
            self.data.reserve_exact(want - self.data.len());
        }
        self.data.push(byte);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
