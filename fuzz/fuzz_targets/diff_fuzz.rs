#![no_main]
use libfuzzer_sys::fuzz_target;
use oxidump::diff::{DiffOptions, diff_streams};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let split = data[0] as usize % data.len();
    let (a, b) = data.split_at(split);

    let mut out = Vec::new();
    let stats = diff_streams(&mut &a[..], &mut &b[..], &mut out, &DiffOptions::default(), None)
        .unwrap();
    assert_eq!(stats.bytes_a, a.len() as u64);
    assert_eq!(stats.bytes_b, b.len() as u64);
});
