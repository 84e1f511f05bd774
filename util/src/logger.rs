//! Logging setup
//!
//! Log records go to two sinks: stdout, with coloured level tags, and the
//! session log file as plain text. Each line starts with the seconds elapsed
//! since the session epoch. Debug and trace lines also name their target.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The log level must be `INFO` or more verbose, found `{0}`")]
    LevelTooQuiet(LevelFilter),

    #[error("Unrecognised log level `{0}`, expected info, debug or trace")]
    UnknownLevel(String),

    #[error("Cannot open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Cannot install the logger: {0}")]
    FernInitError(#[from] log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the global logger. Must only be called once per process.
///
/// `target_caps` holds the least verbose level to allow for chatty targets,
/// as `(target, cap)`. A cap never makes a target more verbose than
/// `min_level`.
pub fn logger_init(
    min_level: LevelFilter,
    session: &Session,
    target_caps: &[(&str, LevelFilter)]
) -> Result<(), LoggerInitError> {
    if min_level < LevelFilter::Info {
        return Err(LoggerInitError::LevelTooQuiet(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}{}",
                elapsed(),
                coloured_tag(record.level()),
                target_prefix(record),
                message
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}{}",
                elapsed(),
                level_tag(record.level()),
                target_prefix(record),
                message
            ))
        })
        .chain(log_file);

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for (target, level) in capped_levels(min_level, target_caps) {
        dispatch = dispatch.level_for(target, level);
    }

    dispatch
        .chain(stdout)
        .chain(file)
        .apply()?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session.epoch);
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Parse a log level as given on the command line, ignoring case.
pub fn parse_level(name: &str) -> Result<LevelFilter, LoggerInitError> {
    match name.to_ascii_lowercase().as_str() {
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        _ => Err(LoggerInitError::UnknownLevel(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn capped_levels(
    min_level: LevelFilter,
    target_caps: &[(&str, LevelFilter)]
) -> Vec<(String, LevelFilter)> {
    target_caps
        .iter()
        .map(|(target, cap)| (target.to_string(), min_level.min(*cap)))
        .collect()
}

fn elapsed() -> f64 {
    session::get_elapsed_seconds().unwrap_or(0.0)
}

fn target_prefix(record: &Record) -> String {
    if record.level() > Level::Info {
        format!("{}: ", record.target())
    }
    else {
        String::new()
    }
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    }
}

fn coloured_tag(level: Level) -> ColoredString {
    let tag = level_tag(level);

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info  => tag.normal(),
        Level::Warn  => tag.yellow(),
        Level::Error => tag.red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::Trace);
        assert!(matches!(
            parse_level("warn"),
            Err(LoggerInitError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_capped_levels() {
        let caps = [("arm_lib::sim_bus", LevelFilter::Debug)];

        assert_eq!(
            capped_levels(LevelFilter::Trace, &caps),
            vec![("arm_lib::sim_bus".to_string(), LevelFilter::Debug)]
        );
        assert_eq!(
            capped_levels(LevelFilter::Info, &caps),
            vec![("arm_lib::sim_bus".to_string(), LevelFilter::Info)]
        );
        assert!(capped_levels(LevelFilter::Trace, &[]).is_empty());
    }

    #[test]
    fn test_target_only_when_verbose() {
        let info = Record::builder()
            .level(Level::Info)
            .target("arm_lib::pursuit")
            .build();
        let debug = Record::builder()
            .level(Level::Debug)
            .target("arm_lib::pursuit")
            .build();

        assert_eq!(target_prefix(&info), "");
        assert_eq!(target_prefix(&debug), "arm_lib::pursuit: ");
    }
}
