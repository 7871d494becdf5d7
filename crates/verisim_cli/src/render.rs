//! Implementation of the `verisim render` command.

use verisim_common::Radix;
use verisim_config::MIN_COLUMNS;
use verisim_trace::{Timescale, Window};

use crate::pipeline::{load_settings, load_trace, parse_time, select_signals};
use crate::waveform::render_text;
use crate::{GlobalArgs, RenderArgs};

/// Runs the `verisim render` command.
pub fn run(args: &RenderArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_settings(global)?;
    let trace = load_trace(&args.dump, &config, global)?;
    let selection = select_signals(&trace, &args.signal, &config)?;

    let window = resolve_window(args, trace.timescale(), trace.max_time())?;
    let columns = args.columns.unwrap_or(config.render.columns);
    if columns < MIN_COLUMNS {
        return Err(format!("--columns must be at least {MIN_COLUMNS}, got {columns}").into());
    }
    let radix = args.radix.map(Radix::from).unwrap_or(config.render.radix);

    let projection = trace.project(window, &selection, radix)?;
    print!("{}", render_text(&projection, trace.timescale(), columns));
    Ok(0)
}

/// Parses `--from` and `--to`, defaulting to the whole trace.
fn resolve_window(
    args: &RenderArgs,
    timescale: Timescale,
    max_time: u64,
) -> Result<Window, Box<dyn std::error::Error>> {
    let start = match &args.from {
        Some(s) => parse_time(s, timescale)?,
        None => 0,
    };
    let end = match &args.to {
        Some(s) => parse_time(s, timescale)?,
        None => max_time,
    };
    Ok(Window::new(start, end))
}
