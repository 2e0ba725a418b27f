#![no_main]
use libfuzzer_sys::fuzz_target;
use oxidump::stream::{DecodeOptions, undump_stream};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through both decode modes. The decoder must never
    // panic — only return errors.
    let mut out = Vec::new();
    let _ = undump_stream(&mut &data[..], &mut out, &DecodeOptions::default(), None);

    out.clear();
    let _ = undump_stream(&mut &data[..], &mut out, &DecodeOptions { binary: true }, None);
});
