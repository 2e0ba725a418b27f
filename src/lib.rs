//! Oxidump: bidirectional hex dump codec with binary diff.
//!
//! The crate provides:
//! - The line-level codec (`dump`): cell addressing, rendering, format
//!   sniffing and parsing
//! - Stream drivers (`stream`): encode/decode across arbitrary-sized reads
//! - Side-by-side binary differencing (`diff`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use oxidump::dump::{DumpFlags, WordWidth};
//! use oxidump::stream::{DumpOptions, dump_stream};
//!
//! let data = b"hello world";
//! let mut out = Vec::new();
//! let opts = DumpOptions {
//!     width: WordWidth::Byte,
//!     flags: DumpFlags::SHOW_OFFSET32 | DumpFlags::SHOW_CHARS,
//!     offset: 0,
//!     length: None,
//! };
//! let stats = dump_stream(&mut &data[..], &mut out, &opts, None).unwrap();
//! assert_eq!(stats.bytes_in, 11);
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.starts_with("00000000: 68 65 6c 6c 6f"));
//! ```

pub mod diff;
pub mod dump;
pub mod io;
pub mod stream;

#[cfg(feature = "cli")]
pub mod cli;
