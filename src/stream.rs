// Stream drivers: encode and decode across arbitrary-sized reads.
//
// Pipes never guarantee 16-byte alignment, so the encode side carries a
// partial tail across chunk boundaries and only ever emits whole display
// lines until end-of-stream. The decode side works line-at-a-time through
// a `BufRead`, sniffing the format once on the first non-empty line.

use std::io::{self, BufRead, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use thiserror::Error;

use crate::dump::decoder::{LineFault, ParseErrorKind, decode_line};
use crate::dump::encoder::encode_line;
use crate::dump::sniffer::{Detection, ReverseFormat, detect};
use crate::dump::{BufferError, DumpFlags, FlagsError, LINE_WIDTH, LineBuffer, WordWidth};

/// Read/write buffer size for the drivers.
pub(crate) const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for the encode direction.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("invalid dump flags: {0}")]
    Flags(#[from] FlagsError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Error type for the decode direction.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The first non-empty line matched no known dump format. Fatal for the
    /// whole stream.
    #[error("line {line}: input does not match any known dump format")]
    FormatNotRecognized { line: u64 },
    /// Malformed text at an exact position (strict mode only).
    #[error("line {line}, column {column}: {kind}")]
    Parse {
        line: u64,
        column: usize,
        kind: ParseErrorKind,
    },
    /// Line buffer growth failed; output written so far is left intact.
    #[error("line {line}: {source}")]
    Buffer { line: u64, source: BufferError },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// Encode direction
// ---------------------------------------------------------------------------

/// Options for the encode direction.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub width: WordWidth,
    pub flags: DumpFlags,
    /// Logical stream offset of the first byte the reader will deliver.
    /// Offset prefixes start here; positioning the reader (seek or
    /// read-and-discard) is the caller's job.
    pub offset: u64,
    /// Stop after this many bytes.
    pub length: Option<u64>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            width: WordWidth::Byte,
            flags: DumpFlags::standard(),
            offset: 0,
            length: None,
        }
    }
}

/// Statistics returned by the encode direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpStats {
    /// Bytes rendered into lines.
    pub bytes_in: u64,
    /// Display lines written.
    pub lines_out: u64,
    /// The interrupt flag stopped the dump early.
    pub cancelled: bool,
}

/// Incremental hex dump encoder.
///
/// Feed bytes with [`write_bytes`](Self::write_bytes) in chunks of any
/// size; whole 16-byte lines are emitted as soon as data beyond them
/// exists, so the C-style mode always knows whether more data follows.
/// [`finish`](Self::finish) flushes the final partial line.
pub struct StreamDumper<'a, W: Write> {
    out: W,
    width: WordWidth,
    flags: DumpFlags,
    offset: u64,
    carry: Vec<u8>,
    stats: DumpStats,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, W: Write> StreamDumper<'a, W> {
    pub fn new(
        out: W,
        width: WordWidth,
        flags: DumpFlags,
        start_offset: u64,
        cancel: Option<&'a AtomicBool>,
    ) -> Result<Self, DumpError> {
        flags.validate()?;
        Ok(Self {
            out,
            width,
            flags,
            offset: start_offset,
            carry: Vec::with_capacity(BUF_SIZE + LINE_WIDTH),
            stats: DumpStats::default(),
            cancel,
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.stats.cancelled
    }

    /// Accept a chunk of stream bytes, emitting every line that is now
    /// known not to be the last one.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), DumpError> {
        if self.stats.cancelled {
            return Ok(());
        }
        self.carry.extend_from_slice(data);
        let mut consumed = 0;
        while self.carry.len() - consumed > LINE_WIDTH {
            if self.check_cancel() {
                self.carry.clear();
                return Ok(());
            }
            self.emit(consumed, consumed + LINE_WIDTH, true)?;
            consumed += LINE_WIDTH;
        }
        self.carry.drain(..consumed);
        Ok(())
    }

    /// Flush the final (possibly partial) line and return the stats.
    pub fn finish(mut self) -> Result<DumpStats, DumpError> {
        if !self.stats.cancelled && !self.carry.is_empty() && !self.check_cancel() {
            self.emit(0, self.carry.len(), false)?;
        }
        self.out.flush()?;
        debug!(
            "dump: {} bytes in, {} lines out",
            self.stats.bytes_in, self.stats.lines_out
        );
        Ok(self.stats)
    }

    fn check_cancel(&mut self) -> bool {
        if self.cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            self.stats.cancelled = true;
        }
        self.stats.cancelled
    }

    fn emit(&mut self, from: usize, to: usize, more: bool) -> Result<(), DumpError> {
        let bytes = &self.carry[from..to];
        let line = encode_line(bytes, self.offset, self.width, self.flags, None, more);
        let text = line.to_plain();
        self.out.write_all(text.trim_end_matches(' ').as_bytes())?;
        self.out.write_all(b"\n")?;
        self.offset += bytes.len() as u64;
        self.stats.bytes_in += bytes.len() as u64;
        self.stats.lines_out += 1;
        Ok(())
    }
}

/// Dump a whole byte stream.
///
/// The reader must already be positioned at logical offset `opts.offset`
/// (see [`discard_exact`] for non-seekable sources).
pub fn dump_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: W,
    opts: &DumpOptions,
    cancel: Option<&AtomicBool>,
) -> Result<DumpStats, DumpError> {
    let mut dumper = StreamDumper::new(writer, opts.width, opts.flags, opts.offset, cancel)?;
    let mut remaining = opts.length.unwrap_or(u64::MAX);
    let mut buf = vec![0u8; BUF_SIZE];
    while remaining > 0 && !dumper.is_cancelled() {
        let want = usize::try_from(remaining).unwrap_or(buf.len()).min(buf.len());
        let n = reader.read(&mut buf[..want])?;
        if n == 0 {
            break;
        }
        remaining -= n as u64;
        dumper.write_bytes(&buf[..n])?;
    }
    dumper.finish()
}

/// Read and drop `count` bytes from a non-seekable source, for `-o` style
/// offsets on pipes. Returns the bytes actually discarded (short at EOF).
pub fn discard_exact<R: Read>(reader: &mut R, count: u64) -> io::Result<u64> {
    let mut buf = [0u8; 4096];
    let mut left = count;
    while left > 0 {
        let want = usize::try_from(left).unwrap_or(buf.len()).min(buf.len());
        let n = reader.read(&mut buf[..want])?;
        if n == 0 {
            break;
        }
        left -= n as u64;
    }
    Ok(count - left)
}

// ---------------------------------------------------------------------------
// Decode direction
// ---------------------------------------------------------------------------

/// Options for the decode direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Raw binary-stream decode: admit packed digit runs, grow the line
    /// buffer without bound, and treat every parse fault as fatal. The
    /// default (reverse) mode is tolerant: a fault ends the stream cleanly
    /// after the whole words already decoded on that line, since trailing
    /// annotation is common in hand-edited dumps.
    pub binary: bool,
}

/// Statistics returned by the decode direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct UndumpStats {
    pub lines_in: u64,
    pub bytes_out: u64,
    /// Tolerant mode hit a malformed token and stopped early.
    pub truncated: bool,
    pub cancelled: bool,
}

/// Decode previously-rendered hex text back into bytes.
///
/// The first non-empty line fixes the format for the whole stream.
/// Decoded bytes are flushed per line, so memory stays bounded to one
/// line (plus the growable buffer in binary mode).
pub fn undump_stream<R: BufRead, W: Write>(
    reader: &mut R,
    mut writer: W,
    opts: &DecodeOptions,
    cancel: Option<&AtomicBool>,
) -> Result<UndumpStats, DecodeError> {
    let mut stats = UndumpStats::default();
    let mut fmt: Option<ReverseFormat> = None;
    let mut buf = if opts.binary {
        LineBuffer::growable()
    } else {
        LineBuffer::fixed(LINE_WIDTH)
    };
    let mut line = String::new();

    loop {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            stats.cancelled = true;
            break;
        }
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        stats.lines_in += 1;

        let cur = match fmt {
            Some(f) => f,
            None => {
                let probe = line.trim_end_matches([' ', '\t', '\r', '\n']);
                if probe.is_empty() {
                    continue;
                }
                let detection = detect(probe, opts.binary).map_err(|_| {
                    DecodeError::FormatNotRecognized {
                        line: stats.lines_in,
                    }
                })?;
                if let Detection::Ambiguous { chosen, candidates } = detection {
                    debug!(
                        "undump: line {} matches {candidates} formats, using {chosen:?}",
                        stats.lines_in
                    );
                }
                *fmt.insert(detection.format())
            }
        };

        buf.clear();
        match decode_line(&line, &cur, &mut buf) {
            Ok(_) => {
                writer.write_all(buf.as_slice())?;
                stats.bytes_out += buf.len() as u64;
            }
            Err(LineFault::Parse { kind, column }) => {
                if opts.binary {
                    return Err(DecodeError::Parse {
                        line: stats.lines_in,
                        column,
                        kind,
                    });
                }
                // Tolerant reverse mode: keep the whole words decoded
                // before the fault and end the stream cleanly.
                writer.write_all(buf.as_slice())?;
                stats.bytes_out += buf.len() as u64;
                stats.truncated = true;
                debug!(
                    "undump: stopping at line {}, column {column}: {kind}",
                    stats.lines_in
                );
                break;
            }
            Err(LineFault::Buffer(source)) => {
                return Err(DecodeError::Buffer {
                    line: stats.lines_in,
                    source,
                });
            }
        }
    }

    writer.flush()?;
    debug!(
        "undump: {} lines in, {} bytes out",
        stats.lines_in, stats.bytes_out
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
