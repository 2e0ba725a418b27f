// File-level I/O helpers.
//
// Wraps the stream drivers with buffered file handling. Seekable inputs
// honor `-o` offsets by seeking, rounded down to the sector size so
// direct/unbuffered reads stay aligned; the remainder is discarded by
// reading. Pipes use `discard_exact` instead.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

use crate::diff::{DiffError, DiffOptions, DiffStats, diff_streams};
use crate::stream::{
    BUF_SIZE, DecodeError, DecodeOptions, DumpError, DumpOptions, DumpStats, UndumpStats,
    discard_exact, dump_stream, undump_stream,
};

/// Native sector size assumed for seek alignment.
pub const SECTOR_SIZE: u64 = 512;

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("dump error: {0}")]
    Dump(#[from] DumpError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),
}

/// Open `path` positioned at logical `offset`.
///
/// Seeks to the sector-aligned floor of `offset` and reads the remainder
/// away, so the returned reader delivers the byte at `offset` first.
pub fn open_input_at(path: &Path, offset: u64) -> io::Result<BufReader<File>> {
    let mut file = File::open(path)?;
    let aligned = offset & !(SECTOR_SIZE - 1);
    if aligned > 0 {
        file.seek(SeekFrom::Start(aligned))?;
    }
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let remainder = offset - aligned;
    if remainder > 0 {
        discard_exact(&mut reader, remainder)?;
    }
    Ok(reader)
}

/// Dump a file to a text file.
pub fn dump_file(
    input: &Path,
    output: &Path,
    opts: &DumpOptions,
) -> Result<DumpStats, IoError> {
    let mut reader = open_input_at(input, opts.offset)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output)?);
    let stats = dump_stream(&mut reader, &mut writer, opts, None)?;
    Ok(stats)
}

/// Decode a dump text file back to a binary file.
pub fn undump_file(
    input: &Path,
    output: &Path,
    opts: &DecodeOptions,
) -> Result<UndumpStats, IoError> {
    let mut reader = BufReader::with_capacity(BUF_SIZE, File::open(input)?);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output)?);
    let stats = undump_stream(&mut reader, &mut writer, opts, None)?;
    Ok(stats)
}

/// Diff two files, writing rendered line pairs to `writer`.
pub fn diff_files<W: io::Write>(
    left: &Path,
    right: &Path,
    writer: W,
    opts: &DiffOptions,
) -> Result<DiffStats, IoError> {
    let mut a = BufReader::with_capacity(BUF_SIZE, File::open(left)?);
    let mut b = BufReader::with_capacity(BUF_SIZE, File::open(right)?);
    let stats = diff_streams(&mut a, &mut b, writer, opts, None)?;
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp_file(name: &str, data: &[u8]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("oxidump_io_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    fn cleanup_temp_files(paths: &[&Path]) {
        for p in paths {
            let _ = std::fs::remove_file(p);
        }
    }

    #[test]
    fn dump_undump_file_roundtrip() {
        let data: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
        let bin_path = write_temp_file("roundtrip.bin", &data);
        let txt_path = write_temp_file("roundtrip.txt", b"");
        let out_path = write_temp_file("roundtrip.out", b"");

        let dump_stats = dump_file(&bin_path, &txt_path, &DumpOptions::default()).unwrap();
        assert_eq!(dump_stats.bytes_in, 1000);
        assert_eq!(dump_stats.lines_out, 63);

        let undump_stats =
            undump_file(&txt_path, &out_path, &DecodeOptions::default()).unwrap();
        assert_eq!(undump_stats.bytes_out, 1000);
        assert_eq!(std::fs::read(&out_path).unwrap(), data);

        cleanup_temp_files(&[&bin_path, &txt_path, &out_path]);
    }

    #[test]
    fn open_input_at_crosses_sector_boundaries() {
        let data: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
        let path = write_temp_file("seek.bin", &data);

        for offset in [0u64, 1, 511, 512, 513, 1000] {
            let mut reader = open_input_at(&path, offset).unwrap();
            let mut first = [0u8; 1];
            io::Read::read_exact(&mut reader, &mut first).unwrap();
            assert_eq!(first[0], data[offset as usize], "offset {offset}");
        }

        cleanup_temp_files(&[&path]);
    }

    #[test]
    fn dump_file_honors_offset_and_length() {
        let data: Vec<u8> = (0..100).collect();
        let bin_path = write_temp_file("clamped.bin", &data);
        let txt_path = write_temp_file("clamped.txt", b"");

        let opts = DumpOptions {
            offset: 32,
            length: Some(16),
            ..Default::default()
        };
        let stats = dump_file(&bin_path, &txt_path, &opts).unwrap();
        assert_eq!(stats.bytes_in, 16);
        assert_eq!(stats.lines_out, 1);

        let text = std::fs::read_to_string(&txt_path).unwrap();
        assert!(text.starts_with("00000020: 20 21 22"));

        cleanup_temp_files(&[&bin_path, &txt_path]);
    }

    #[test]
    fn diff_files_reports_differences() {
        let a: Vec<u8> = vec![0u8; 64];
        let mut b = a.clone();
        b[40] = 0xFF;
        let a_path = write_temp_file("diff_a.bin", &a);
        let b_path = write_temp_file("diff_b.bin", &b);

        let mut out = Vec::new();
        let stats = diff_files(&a_path, &b_path, &mut out, &DiffOptions::default()).unwrap();
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.differing, 1);
        assert!(String::from_utf8(out).unwrap().starts_with("00000020: "));

        cleanup_temp_files(&[&a_path, &b_path]);
    }
}
