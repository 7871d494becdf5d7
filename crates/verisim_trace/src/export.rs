//! Tabular and JSON writers for a flattened change table.

use std::io::{self, Write};

use serde::Serialize;
use verisim_common::Radix;

use crate::error::TraceResult;
use crate::query::TimeStep;
use crate::signal::SignalId;
use crate::trace::Trace;

/// Writes one `time,signal,value` row per change, with a header row.
///
/// Signal names are full dotted names; values use `radix`.
pub fn write_csv<W: Write>(trace: &Trace, steps: &[TimeStep], radix: Radix, mut out: W) -> TraceResult<()> {
    writeln!(out, "time,signal,value")?;
    for step in steps {
        for change in &step.changes {
            let name = signal_name(trace, change.signal);
            writeln!(
                out,
                "{},{},{}",
                step.time,
                csv_field(&name),
                change.value.format_radix(radix)
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonExport {
    timescale: String,
    max_time: u64,
    radix: Radix,
    signals: Vec<JsonSignal>,
    steps: Vec<JsonStep>,
}

#[derive(Serialize)]
struct JsonSignal {
    name: String,
    width: u32,
    var_type: String,
}

#[derive(Serialize)]
struct JsonStep {
    time: u64,
    changes: Vec<JsonChange>,
}

#[derive(Serialize)]
struct JsonChange {
    signal: String,
    value: String,
}

/// Writes the table as a JSON document of time steps.
///
/// The document also lists the selected signals, the time scale and
/// `max_time`, which is enough to replay the table into timelines.
pub fn write_json<W: Write>(trace: &Trace, steps: &[TimeStep], radix: Radix, mut out: W) -> TraceResult<()> {
    let mut signals: Vec<JsonSignal> = Vec::new();
    if let Some(first) = steps.first() {
        for change in &first.changes {
            if let Some(s) = trace.signal(change.signal) {
                signals.push(JsonSignal {
                    name: s.full_name(),
                    width: s.width,
                    var_type: s.var_type.clone(),
                });
            }
        }
    }
    let doc = JsonExport {
        timescale: trace.timescale().to_string(),
        max_time: trace.max_time(),
        radix,
        signals,
        steps: steps
            .iter()
            .map(|step| JsonStep {
                time: step.time,
                changes: step
                    .changes
                    .iter()
                    .map(|c| JsonChange {
                        signal: signal_name(trace, c.signal),
                        value: c.value.format_radix(radix),
                    })
                    .collect(),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut out, &doc).map_err(io::Error::from)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn signal_name(trace: &Trace, id: SignalId) -> String {
    trace
        .signal(id)
        .map_or_else(|| format!("#{}", id.as_raw()), |s| s.full_name())
}

/// Quotes a field containing a comma, quote or line break.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
