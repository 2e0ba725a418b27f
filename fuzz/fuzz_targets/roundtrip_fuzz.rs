#![no_main]
use libfuzzer_sys::fuzz_target;
use oxidump::dump::{DumpFlags, LINE_WIDTH, LineBuffer, ReverseFormat, WordWidth, decode_line};
use oxidump::stream::{DumpOptions, dump_stream};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Use first byte as control flags.
    let control = data[0];
    let payload = &data[1..];
    let width = WordWidth::ALL[(control & 3) as usize];
    let flags = match (control >> 2) & 3 {
        0 => DumpFlags::standard(),
        1 => DumpFlags::SHOW_OFFSET64 | DumpFlags::SHOW_CHARS,
        2 => DumpFlags::empty(),
        _ => DumpFlags::SHOW_OFFSET32 | DumpFlags::SHOW_WIDE_CHARS,
    };

    let opts = DumpOptions {
        width,
        flags,
        ..Default::default()
    };
    let mut text = Vec::new();
    dump_stream(&mut &payload[..], &mut text, &opts, None).unwrap();
    let text = String::from_utf8(text).unwrap();

    let fmt = ReverseFormat {
        prefix_chars: if flags.contains(DumpFlags::SHOW_OFFSET64) {
            19
        } else if flags.contains(DumpFlags::SHOW_OFFSET32) {
            10
        } else {
            0
        },
        width,
        no_whitespace: false,
    };
    let mut decoded = Vec::new();
    let mut buf = LineBuffer::fixed(LINE_WIDTH);
    for line in text.lines() {
        buf.clear();
        decode_line(line, &fmt, &mut buf).unwrap();
        decoded.extend_from_slice(buf.as_slice());
    }
    assert_eq!(decoded, payload);
});
