use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};

/// Maps a textual level (`"debug"`, `"info"`, `"warn"`, `"error"`) to a
/// filter, defaulting to `Info` for anything unrecognized or absent.
pub fn level_from_option(loglevel: Option<&str>) -> LevelFilter {
    match loglevel {
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Initializes a terminal logger at the given level. Calling it twice is
/// harmless: the second init fails quietly and the first logger stays
/// active.
pub fn init_terminal_logger(loglevel: Option<&str>) {
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level_from_option(loglevel),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_from_option(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from_option(Some("error")), LevelFilter::Error);
        assert_eq!(level_from_option(Some("verbose")), LevelFilter::Info);
        assert_eq!(level_from_option(None), LevelFilter::Info);
    }

    #[test]
    fn test_double_init_is_harmless() {
        init_terminal_logger(Some("info"));
        init_terminal_logger(Some("debug"));
    }
}
