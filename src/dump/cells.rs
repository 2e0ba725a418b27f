// Display cell addressing.
//
// Pure mapping between a line-relative byte offset (0..16) and a display
// column, across the three zones of a dump line: offset prefix, hex digits,
// character sidebar. Word values display their least-addressed byte last,
// so digit pairs within a word run right-to-left through the buffer.

use super::{DumpFlags, LINE_WIDTH, WordWidth};

/// Cells occupied by the 32-bit offset prefix (`%08x: `).
pub const OFFSET32_PREFIX_CELLS: usize = 10;

/// Cells occupied by the 64-bit two-half offset prefix (`%08x`` ` ``%08x: `).
pub const OFFSET64_PREFIX_CELLS: usize = 19;

/// Column position of the backtick inside a qword group.
const QWORD_TICK_CELL: usize = 8;

/// What a display column addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Inside the offset prefix.
    OffsetPrefix,
    /// A hex digit cell.
    HexDigit {
        /// Line-relative byte offset the digit belongs to.
        byte_index: usize,
        /// 4 for the high nibble, 0 for the low nibble.
        nibble_shift: u32,
        /// The cell falls past the bytes present on a short line.
        beyond_buffer_end: bool,
    },
    /// A space or backtick between digit groups.
    WordSeparator,
    /// The single separator cell before the character sidebar.
    SidebarSeparator,
    /// A character sidebar cell.
    Char {
        /// Line-relative byte offset of the glyph's first byte.
        byte_index: usize,
        beyond_buffer_end: bool,
    },
    /// Past the last cell of the line.
    PastEnd,
}

/// Width of the offset prefix zone for the given flags.
pub fn offset_prefix_cells(flags: DumpFlags) -> usize {
    if flags.contains(DumpFlags::SHOW_OFFSET64) {
        OFFSET64_PREFIX_CELLS
    } else if flags.contains(DumpFlags::SHOW_OFFSET32) {
        OFFSET32_PREFIX_CELLS
    } else {
        0
    }
}

/// Width of the hex digit zone, separators included.
pub fn hex_zone_cells(width: WordWidth) -> usize {
    width.cells_per_word() * width.words_per_line()
}

/// Resolve what `column` addresses on a line carrying `line_len` bytes.
///
/// Not meaningful for C-style output, which has its own fixed shape.
pub fn cell_at(column: usize, width: WordWidth, flags: DumpFlags, line_len: usize) -> Cell {
    debug_assert!(!flags.contains(DumpFlags::C_STYLE));
    debug_assert!(line_len <= LINE_WIDTH);

    let prefix = offset_prefix_cells(flags);
    if column < prefix {
        return Cell::OffsetPrefix;
    }

    let col = column - prefix;
    let cpw = width.cells_per_word();
    let hex_cells = hex_zone_cells(width);

    if col < hex_cells {
        let word = col / cpw;
        let cell = col % cpw;
        let digit = match width {
            WordWidth::Qword => {
                if cell == QWORD_TICK_CELL || cell == cpw - 1 {
                    return Cell::WordSeparator;
                }
                if cell < QWORD_TICK_CELL { cell } else { cell - 1 }
            }
            w => {
                if cell == w.digits() {
                    return Cell::WordSeparator;
                }
                cell
            }
        };
        let pair = digit / 2;
        let byte_index = word * width.bytes() + (width.bytes() - 1 - pair);
        return Cell::HexDigit {
            byte_index,
            nibble_shift: if digit % 2 == 0 { 4 } else { 0 },
            beyond_buffer_end: byte_index >= line_len,
        };
    }

    let wide = flags.contains(DumpFlags::SHOW_WIDE_CHARS);
    if !flags.contains(DumpFlags::SHOW_CHARS) && !wide {
        return Cell::PastEnd;
    }

    let col = col - hex_cells;
    if col == 0 {
        return Cell::SidebarSeparator;
    }
    let glyph = col - 1;
    let glyph_bytes = if wide { 2 } else { 1 };
    if glyph >= LINE_WIDTH / glyph_bytes {
        return Cell::PastEnd;
    }
    let byte_index = glyph * glyph_bytes;
    Cell::Char {
        byte_index,
        beyond_buffer_end: byte_index >= line_len,
    }
}

/// Column of the high-nibble digit of `byte_index`.
pub fn column_of_byte(byte_index: usize, width: WordWidth, flags: DumpFlags) -> usize {
    debug_assert!(byte_index < LINE_WIDTH);
    let w = width.bytes();
    let word = byte_index / w;
    let pair = w - 1 - (byte_index % w);
    let mut digit_cell = 2 * pair;
    if width == WordWidth::Qword && digit_cell >= QWORD_TICK_CELL {
        digit_cell += 1;
    }
    offset_prefix_cells(flags) + word * width.cells_per_word() + digit_cell
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
