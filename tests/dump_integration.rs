// Integration tests for the dump/undump pipeline.
//
// Exercises the full path: bytes -> StreamDumper -> text -> format sniffer
// -> undump_stream -> bytes, across word widths, offset modes, unaligned
// reads and malformed input.

use oxidump::dump::{
    Detection, DumpFlags, LINE_WIDTH, LineBuffer, ReverseFormat, WordWidth, decode_line, detect,
};
use oxidump::stream::{
    DecodeError, DecodeOptions, DumpOptions, StreamDumper, dump_stream, undump_stream,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dump(data: &[u8], opts: &DumpOptions) -> String {
    let mut out = Vec::new();
    dump_stream(&mut &data[..], &mut out, opts, None).unwrap();
    String::from_utf8(out).unwrap()
}

fn undump(text: &str, opts: &DecodeOptions) -> Vec<u8> {
    let mut out = Vec::new();
    undump_stream(&mut text.as_bytes(), &mut out, opts, None).unwrap();
    out
}

/// Decode with a known format, bypassing the sniffer. A lone short line
/// can start with padding blanks the sniffer does not accept.
fn undump_with(text: &str, fmt: &ReverseFormat) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = LineBuffer::fixed(LINE_WIDTH);
    for line in text.lines() {
        buf.clear();
        decode_line(line, fmt, &mut buf).unwrap();
        out.extend_from_slice(buf.as_slice());
    }
    out
}

fn generate_data(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        data.push((state >> 33) as u8);
    }
    data
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_all_widths_all_lengths() {
    for width in WordWidth::ALL {
        let fmt = ReverseFormat {
            prefix_chars: 10,
            width,
            no_whitespace: false,
        };
        for len in [0usize, 1, 15, 16, 17, 31, 32, 1000] {
            let data = generate_data(len, 42 + len as u64);
            let opts = DumpOptions {
                width,
                ..Default::default()
            };
            let text = dump(&data, &opts);
            let decoded = undump_with(&text, &fmt);
            assert_eq!(decoded, data, "width {width:?} len {len}");
        }
    }
}

#[test]
fn roundtrip_via_sniffed_format() {
    // One full first line fixes the format for the whole stream.
    for width in WordWidth::ALL {
        for len in [16usize, 17, 100, 1000] {
            let data = generate_data(len, 5 + len as u64);
            let opts = DumpOptions {
                width,
                ..Default::default()
            };
            let text = dump(&data, &opts);
            let decoded = undump(&text, &DecodeOptions::default());
            assert_eq!(decoded, data, "width {width:?} len {len}");
        }
    }
}

#[test]
fn roundtrip_with_wide_offsets() {
    let data = generate_data(100, 7);
    for width in WordWidth::ALL {
        let opts = DumpOptions {
            width,
            flags: DumpFlags::SHOW_OFFSET64 | DumpFlags::SHOW_CHARS,
            ..Default::default()
        };
        let text = dump(&data, &opts);
        assert!(text.starts_with("00000000`00000000: "), "width {width:?}");
        let decoded = undump(&text, &DecodeOptions::default());
        assert_eq!(decoded, data, "width {width:?}");
    }
}

#[test]
fn roundtrip_without_offset_or_chars() {
    let data = generate_data(50, 9);
    for width in WordWidth::ALL {
        let opts = DumpOptions {
            width,
            flags: DumpFlags::empty(),
            ..Default::default()
        };
        let decoded = undump(&dump(&data, &opts), &DecodeOptions::default());
        assert_eq!(decoded, data, "width {width:?}");
    }
}

// ---------------------------------------------------------------------------
// Rendering details
// ---------------------------------------------------------------------------

#[test]
fn partial_line_pads_absent_high_bytes() {
    let data = b"ABCDE";
    let opts = DumpOptions {
        width: WordWidth::Dword,
        ..Default::default()
    };
    let text = dump(data, &opts);
    // First dword complete and byte-reversed, second shows only its low
    // byte right-aligned, then two absent groups and the sidebar.
    assert_eq!(
        text,
        format!("00000000: 44434241       45{}ABCDE\n", " ".repeat(20))
    );
}

#[test]
fn c_style_comma_boundaries() {
    let opts = DumpOptions {
        flags: DumpFlags::C_STYLE,
        ..Default::default()
    };

    // Single byte: one line, no trailing comma.
    let text = dump(&[0xAB], &opts);
    assert_eq!(text, "        ab\n");

    // Exactly one full line is still the last line.
    let data: Vec<u8> = (0..16).collect();
    let text = dump(&data, &opts);
    assert_eq!(text.lines().count(), 1);
    assert!(!text.trim_end().ends_with(','));

    // One byte more and the first line gains its continuation comma.
    let data: Vec<u8> = (0..17).collect();
    let text = dump(&data, &opts);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].ends_with("0f,"));
    assert_eq!(lines[1], "        10");
}

#[test]
fn unaligned_feeds_produce_identical_text() {
    let data = generate_data(333, 11);
    let opts = DumpOptions::default();
    let whole = dump(&data, &opts);

    for chunk_size in [1usize, 3, 7, 16, 17, 64] {
        let mut out = Vec::new();
        let mut dumper = StreamDumper::new(&mut out, opts.width, opts.flags, 0, None).unwrap();
        for chunk in data.chunks(chunk_size) {
            dumper.write_bytes(chunk).unwrap();
        }
        dumper.finish().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            whole,
            "chunk size {chunk_size}"
        );
    }
}

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

#[test]
fn sniffer_recovers_generating_width() {
    // A line of distinct bytes is unambiguous for every width.
    let data: Vec<u8> = (0x10..0x20).collect();
    for width in WordWidth::ALL {
        let opts = DumpOptions {
            width,
            ..Default::default()
        };
        let text = dump(&data, &opts);
        let first = text.lines().next().unwrap();
        let detection = detect(first, false).unwrap();
        assert_eq!(detection.format().width, width, "width {width:?}");
        assert_eq!(detection.format().prefix_chars, 10, "width {width:?}");
    }
}

#[test]
fn ambiguous_lines_pick_a_candidate_deterministically() {
    // Eight hex digits with no separators match several interpretations.
    match detect("aabbccdd", true).unwrap() {
        Detection::Ambiguous { chosen, .. } => {
            assert_eq!(chosen.width, WordWidth::Dword);
        }
        Detection::Unique(_) => panic!("expected ambiguity"),
    }
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[test]
fn strict_decode_reports_line_and_column() {
    let text = "00000000: 41 42 43\n00000010: 44 4x 46\n";
    let mut out = Vec::new();
    let err = undump_stream(
        &mut text.as_bytes(),
        &mut out,
        &DecodeOptions { binary: true },
        None,
    )
    .unwrap_err();
    match err {
        DecodeError::Parse { line, column, .. } => {
            assert_eq!(line, 2);
            assert_eq!(column, 14);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(out, b"ABCD");
}

#[test]
fn tolerant_decode_survives_trailing_annotation() {
    let text = "00000000: 48 65 6c 6c 6f   <-- greeting bytes\n";
    let mut out = Vec::new();
    let stats = undump_stream(
        &mut text.as_bytes(),
        &mut out,
        &DecodeOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(out, b"Hello");
    assert!(stats.truncated);
}

#[test]
fn garbage_input_is_rejected_up_front() {
    let mut out = Vec::new();
    let err = undump_stream(
        &mut "ceci n'est pas un dump\n".as_bytes(),
        &mut out,
        &DecodeOptions::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::FormatNotRecognized { line: 1 }));
    assert!(out.is_empty());
}

// ---------------------------------------------------------------------------
// Offsets and lengths
// ---------------------------------------------------------------------------

#[test]
fn offset_and_length_select_a_window() {
    let data = generate_data(4096, 3);
    let opts = DumpOptions {
        offset: 0x100,
        length: Some(32),
        ..Default::default()
    };
    // The driver trusts the reader's position; emulate the seek.
    let text = dump(&data[0x100..], &opts);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("00000100: "));
    assert!(lines[1].starts_with("00000110: "));

    let decoded = undump(&text, &DecodeOptions::default());
    assert_eq!(decoded, &data[0x100..0x120]);
}
