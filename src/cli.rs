// Idiomatic Rust CLI for Oxidump.
//
// Uses explicit subcommands and long-form options. Option validation lives
// here; the codec itself only ever sees typed `DumpFlags`/`WordWidth`
// values and positioned readers.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::diff::{DiffOptions, diff_streams};
use crate::dump::{DumpFlags, LINE_WIDTH, WordWidth};
use crate::io::open_input_at;
use crate::stream::{
    DecodeOptions, DumpOptions, discard_exact, dump_stream, undump_stream,
};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

fn parse_width(s: &str) -> Result<u8, String> {
    match s {
        "1" => Ok(1),
        "2" => Ok(2),
        "4" => Ok(4),
        "8" => Ok(8),
        _ => Err(format!("invalid word width '{s}' (expected 1, 2, 4 or 8)")),
    }
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Hex dump / un-dump codec with binary diff.
#[derive(Parser, Debug)]
#[command(
    name = "oxidump",
    version,
    about = "Hex dump, un-dump and binary diff",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Render a binary stream as hex text.
    Dump(DumpArgs),
    /// Parse hex text back into the original bytes.
    Undump(UndumpArgs),
    /// Show differing lines of two binary files side by side.
    Diff(DiffArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct DisplayArgs {
    /// Bytes per hex group (1, 2, 4 or 8).
    #[arg(short = 'w', long, value_parser = parse_width, default_value = "1")]
    width: u8,

    /// Omit the offset prefix.
    #[arg(long = "no-offset")]
    no_offset: bool,

    /// Use 64-bit offset prefixes.
    #[arg(long = "wide-offset", conflicts_with = "no_offset")]
    wide_offset: bool,

    /// Omit the character sidebar.
    #[arg(long = "no-chars")]
    no_chars: bool,

    /// Echo UTF-16 characters in the sidebar.
    #[arg(long = "wide-chars", conflicts_with = "no_chars")]
    wide_chars: bool,

    /// Emit C array initializer syntax (overrides all other display options).
    #[arg(long = "c-style")]
    c_style: bool,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    #[command(flatten)]
    display: DisplayArgs,

    /// Start dumping at this byte offset (supports K/M/G suffix).
    #[arg(short = 'o', long, value_parser = parse_byte_size, default_value_t = 0)]
    offset: u64,

    /// Dump at most this many bytes (supports K/M/G suffix).
    #[arg(short = 'l', long, value_parser = parse_byte_size)]
    length: Option<u64>,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UndumpArgs {
    /// Input dump text file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Raw binary decode: accept packed digit streams, fail hard on any
    /// malformed token.
    #[arg(short = 'b', long)]
    binary: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Left-hand input file.
    #[arg(value_hint = ValueHint::FilePath)]
    left: PathBuf,

    /// Right-hand input file.
    #[arg(value_hint = ValueHint::FilePath)]
    right: PathBuf,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    #[command(flatten)]
    display: DisplayArgs,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let code = match &cli.command {
        Cmd::Dump(args) => cmd_dump(&cli, args),
        Cmd::Undump(args) => cmd_undump(&cli, args),
        Cmd::Diff(args) => cmd_diff(&cli, args),
        Cmd::Config => cmd_config(),
    };
    process::exit(code);
}

fn display_flags(d: &DisplayArgs) -> DumpFlags {
    if d.c_style {
        return DumpFlags::C_STYLE;
    }
    let mut flags = DumpFlags::empty();
    if !d.no_offset {
        flags |= if d.wide_offset {
            DumpFlags::SHOW_OFFSET64
        } else {
            DumpFlags::SHOW_OFFSET32
        };
    }
    if d.wide_chars {
        flags |= DumpFlags::SHOW_WIDE_CHARS;
    } else if !d.no_chars {
        flags |= DumpFlags::SHOW_CHARS;
    }
    flags
}

fn display_width(d: &DisplayArgs) -> WordWidth {
    // parse_width admits exactly the four valid byte counts.
    WordWidth::from_bytes(d.width as usize).unwrap_or(WordWidth::Byte)
}

fn input_name(path: Option<&PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<stdin>".to_string(),
    }
}

fn open_output(
    path: Option<&PathBuf>,
    use_stdout: bool,
    force: bool,
) -> Result<Box<dyn Write>, i32> {
    let path = match path {
        Some(p) if !use_stdout => p,
        _ => {
            return Ok(Box::new(BufWriter::with_capacity(
                BUF_SIZE,
                io::stdout().lock(),
            )));
        }
    };
    if path.exists() && !force {
        eprintln!(
            "oxidump: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return Err(1);
    }
    match File::create(path) {
        Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
        Err(e) => {
            eprintln!("oxidump: output file: {}: {e}", path.display());
            Err(1)
        }
    }
}

// ---------------------------------------------------------------------------
// Dump command
// ---------------------------------------------------------------------------

fn cmd_dump(cli: &Cli, args: &DumpArgs) -> i32 {
    let opts = DumpOptions {
        width: display_width(&args.display),
        flags: display_flags(&args.display),
        offset: args.offset,
        length: args.length,
    };

    let input = args.input.as_ref().or(args.input_pos.as_ref());
    let mut reader: Box<dyn Read> = match input {
        Some(path) => match open_input_at(path, opts.offset) {
            Ok(r) => Box::new(r),
            Err(e) => {
                eprintln!("oxidump: input file: {}: {e}", path.display());
                return 1;
            }
        },
        None => {
            let mut stdin = BufReader::new(io::stdin());
            if opts.offset > 0
                && let Err(e) = discard_exact(&mut stdin, opts.offset)
            {
                eprintln!("oxidump: <stdin>: {e}");
                return 1;
            }
            Box::new(stdin)
        }
    };

    let output = args.output.as_ref().or(args.output_pos.as_ref());
    let mut writer = match open_output(output, args.stdout, cli.force) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let stats = match dump_stream(&mut reader, &mut writer, &opts, None) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxidump: {}: {e}", input_name(input));
            return 1;
        }
    };
    if let Err(e) = writer.flush() {
        eprintln!("oxidump: write flush error: {e}");
        return 1;
    }

    if cli.verbose > 0 && !cli.quiet {
        eprintln!(
            "oxidump: dump: {} bytes in, {} lines out",
            stats.bytes_in, stats.lines_out
        );
    }
    if cli.json_output {
        let json = serde_json::json!({
            "command": "dump",
            "bytes_in": stats.bytes_in,
            "lines_out": stats.lines_out,
            "cancelled": stats.cancelled,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Undump command
// ---------------------------------------------------------------------------

fn cmd_undump(cli: &Cli, args: &UndumpArgs) -> i32 {
    let opts = DecodeOptions {
        binary: args.binary,
    };

    let input = args.input.as_ref().or(args.input_pos.as_ref());
    let mut reader: Box<dyn BufRead> = match input {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::with_capacity(BUF_SIZE, f)),
            Err(e) => {
                eprintln!("oxidump: input file: {}: {e}", path.display());
                return 1;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let output = args.output.as_ref().or(args.output_pos.as_ref());
    let mut writer = match open_output(output, args.stdout, cli.force) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let stats = match undump_stream(&mut reader, &mut writer, &opts, None) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxidump: {}: {e}", input_name(input));
            return 1;
        }
    };
    if let Err(e) = writer.flush() {
        eprintln!("oxidump: write flush error: {e}");
        return 1;
    }

    if cli.verbose > 0 && !cli.quiet {
        eprintln!(
            "oxidump: undump: {} lines in, {} bytes out",
            stats.lines_in, stats.bytes_out
        );
    }
    if cli.json_output {
        let json = serde_json::json!({
            "command": "undump",
            "lines_in": stats.lines_in,
            "bytes_out": stats.bytes_out,
            "truncated": stats.truncated,
            "cancelled": stats.cancelled,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Diff command
// ---------------------------------------------------------------------------

fn cmd_diff(cli: &Cli, args: &DiffArgs) -> i32 {
    let opts = DiffOptions {
        width: display_width(&args.display),
        flags: display_flags(&args.display),
    };

    let mut a = match File::open(&args.left) {
        Ok(f) => BufReader::with_capacity(BUF_SIZE, f),
        Err(e) => {
            eprintln!("oxidump: {}: {e}", args.left.display());
            return 1;
        }
    };
    let mut b = match File::open(&args.right) {
        Ok(f) => BufReader::with_capacity(BUF_SIZE, f),
        Err(e) => {
            eprintln!("oxidump: {}: {e}", args.right.display());
            return 1;
        }
    };

    let mut writer = match open_output(args.output.as_ref(), false, cli.force) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let stats = match diff_streams(&mut a, &mut b, &mut writer, &opts, None) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxidump: diff: {e}");
            return 1;
        }
    };
    if let Err(e) = writer.flush() {
        eprintln!("oxidump: write flush error: {e}");
        return 1;
    }

    if cli.verbose > 0 && !cli.quiet {
        eprintln!(
            "oxidump: diff: {} lines examined, {} differ",
            stats.lines, stats.differing
        );
    }
    if cli.json_output {
        let json = serde_json::json!({
            "command": "diff",
            "bytes_a": stats.bytes_a,
            "bytes_b": stats.bytes_b,
            "lines": stats.lines,
            "differing": stats.differing,
            "cancelled": stats.cancelled,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxidump".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        match &cli.command {
            Cmd::Dump(a) => {
                let _ = (display_width(&a.display), display_flags(&a.display));
            }
            Cmd::Diff(a) => {
                let _ = (display_width(&a.display), display_flags(&a.display));
            }
            Cmd::Undump(_) | Cmd::Config => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    println!("oxidump version:        {}", env!("CARGO_PKG_VERSION"));
    println!("line width:             {LINE_WIDTH} bytes");
    println!("word widths:            1, 2, 4, 8");
    println!("offset prefixes:        32-bit, 64-bit");
    println!("decode modes:           reverse (tolerant), binary (strict)");
    0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
