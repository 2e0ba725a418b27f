fn main() {
    #[cfg(feature = "cli")]
    oxidump::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxidump: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
