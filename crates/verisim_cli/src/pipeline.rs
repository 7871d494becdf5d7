//! Shared plumbing used by every subcommand.
//!
//! Configuration resolution, dump loading, signal selection and parsing of
//! user-supplied times.

use std::path::Path;

use verisim_config::{find_config, VerisimConfig};
use verisim_trace::{ParseOptions, SignalId, TimeUnit, Timescale, Trace};

use crate::GlobalArgs;

/// Loads the configuration selected by `--config`, `./verisim.toml`, or
/// defaults.
pub fn load_settings(global: &GlobalArgs) -> Result<VerisimConfig, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let config = find_config(global.config.as_deref().map(Path::new), &cwd)?;
    log::debug!("configuration: {config:?}");
    Ok(config)
}

/// Parser options derived from the configuration.
pub fn parse_options(config: &VerisimConfig) -> ParseOptions {
    ParseOptions {
        extend_short_vectors: config.parser.extend_short_vectors,
    }
}

/// Prints a status line to stderr unless `--quiet` is set.
pub fn status(global: &GlobalArgs, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

/// Checks that a dump path exists before handing it to the parser.
pub fn check_dump_path(dump: &str) -> Result<&Path, Box<dyn std::error::Error>> {
    let path = Path::new(dump);
    if !path.exists() {
        return Err(format!("file not found: {dump}").into());
    }
    Ok(path)
}

/// Parses and builds the trace of a dump file.
pub fn load_trace(
    dump: &str,
    config: &VerisimConfig,
    global: &GlobalArgs,
) -> Result<Trace, Box<dyn std::error::Error>> {
    let path = check_dump_path(dump)?;
    let trace = Trace::open(path, parse_options(config))?;
    status(
        global,
        &format!(
            "Loaded {} signals from {dump} (timescale {}, ends at {})",
            trace.signals().len(),
            trace.timescale(),
            trace.max_time()
        ),
    );
    Ok(trace)
}

/// Resolves command-line signal names, falling back to `[view] signals`,
/// then to every signal.
pub fn select_signals(
    trace: &Trace,
    names: &[String],
    config: &VerisimConfig,
) -> Result<Vec<SignalId>, Box<dyn std::error::Error>> {
    let names = if names.is_empty() {
        config.view.signals.as_slice()
    } else {
        names
    };
    Ok(trace.select(names)?)
}

/// Parses a time as raw ticks (`150`) or a duration (`15ns`) converted
/// through the dump's time scale.
///
/// A duration must be a whole number of ticks.
pub fn parse_time(s: &str, timescale: Timescale) -> Result<u64, Box<dyn std::error::Error>> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty time string".into());
    }

    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digit_end == 0 {
        return Err(format!("invalid time: no numeric value in '{s}'").into());
    }

    let number: u64 = s[..digit_end]
        .parse()
        .map_err(|_| format!("invalid number in time '{s}'"))?;

    let unit = s[digit_end..].trim();
    if unit.is_empty() {
        return Ok(number);
    }
    let unit = TimeUnit::parse(unit).ok_or_else(|| {
        format!("unknown time unit '{unit}' (use fs, ps, ns, us, ms, or s)")
    })?;
    timescale.ticks_from(number, unit).ok_or_else(|| {
        format!("{number}{unit} is not a whole number of {timescale} ticks").into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns() -> Timescale {
        Timescale::parse("1ns").unwrap()
    }

    #[test]
    fn parse_time_raw_ticks() {
        assert_eq!(parse_time("150", ns()).unwrap(), 150);
        assert_eq!(parse_time(" 0 ", ns()).unwrap(), 0);
    }

    #[test]
    fn parse_time_with_unit() {
        assert_eq!(parse_time("15ns", ns()).unwrap(), 15);
        assert_eq!(parse_time("2us", ns()).unwrap(), 2000);
        assert_eq!(parse_time("15 ns", ns()).unwrap(), 15);
    }

    #[test]
    fn parse_time_through_coarse_timescale() {
        let ts = Timescale::parse("10ps").unwrap();
        assert_eq!(parse_time("1ns", ts).unwrap(), 100);
        let err = parse_time("15ps", ts).unwrap_err();
        assert!(err.to_string().contains("not a whole number"));
    }

    #[test]
    fn parse_time_invalid() {
        assert!(parse_time("", ns()).is_err());
        assert!(parse_time("ns", ns()).is_err());
        assert!(parse_time("5 minutes", ns()).is_err());
        assert!(parse_time("1.5ns", ns()).is_err());
    }

    #[test]
    fn missing_dump_file() {
        let err = check_dump_path("/nonexistent/run.vcd").unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn parser_options_follow_config() {
        let config = verisim_config::load_config_from_str(
            "[parser]\nextend_short_vectors = true\n",
        )
        .unwrap();
        assert!(parse_options(&config).extend_short_vectors);
        assert!(!parse_options(&VerisimConfig::default()).extend_short_vectors);
    }
}
