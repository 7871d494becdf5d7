//! Implementation of the `verisim export` command.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use verisim_common::Radix;
use verisim_config::{ExportFormat, VerisimConfig};
use verisim_trace::{write_csv, write_json, SignalId, Trace};

use crate::pipeline::{load_settings, load_trace, select_signals, status};
use crate::{ExportArgs, GlobalArgs};

/// Runs the `verisim export` command.
pub fn run(args: &ExportArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_settings(global)?;
    let trace = load_trace(&args.dump, &config, global)?;
    let selection = select_signals(&trace, &args.signal, &config)?;
    let (format, radix) = resolve_output(args, &config);

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            write_table(&trace, &selection, format, radix, BufWriter::new(file))?;
            status(
                global,
                &format!("Exported {} signals to {path}", selection.len()),
            );
        }
        None => write_table(&trace, &selection, format, radix, io::stdout().lock())?,
    }
    Ok(0)
}

/// Command-line flags win over `[export]`, which wins over `[render] radix`.
fn resolve_output(args: &ExportArgs, config: &VerisimConfig) -> (ExportFormat, Radix) {
    let format = args
        .format
        .map(ExportFormat::from)
        .unwrap_or(config.export.format);
    let radix = args
        .radix
        .map(Radix::from)
        .or(config.export.radix)
        .unwrap_or(config.render.radix);
    (format, radix)
}

fn write_table<W: Write>(
    trace: &Trace,
    selection: &[SignalId],
    format: ExportFormat,
    radix: Radix,
    out: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let steps = trace.flatten(selection)?;
    log::debug!("{} time steps for {} signals", steps.len(), selection.len());
    match format {
        ExportFormat::Csv => write_csv(trace, &steps, radix, out)?,
        ExportFormat::Json => write_json(trace, &steps, radix, out)?,
    }
    Ok(())
}
