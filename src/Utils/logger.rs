//! Terminal logger shared by the solvers and the fitting routines.
use simplelog::*;

/// Maps a level name to a filter. `None` stands for the default "info";
/// "off" and "none" switch logging off.
pub fn level_filter(loglevel: Option<&str>) -> Option<LevelFilter> {
    match loglevel {
        None => Some(LevelFilter::Info),
        Some("off") | Some("none") => None,
        Some("debug") => Some(LevelFilter::Debug),
        Some("info") => Some(LevelFilter::Info),
        Some("warn") => Some(LevelFilter::Warn),
        Some("error") => Some(LevelFilter::Error),
        Some(_) => Some(LevelFilter::Info),
    }
}

/// `true` for the level names accepted by the setters
pub fn is_valid_loglevel(level: &str) -> bool {
    matches!(level, "debug" | "info" | "warn" | "error" | "off" | "none")
}

/// Installs a `TermLogger` at the requested level. Returns `false` when logging is switched
/// off or a logger is already installed (the first one stays active).
pub fn init_logger(loglevel: Option<&str>) -> bool {
    let Some(log_option) = level_filter(loglevel) else {
        return false;
    };
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    logger_instance.is_ok()
}
