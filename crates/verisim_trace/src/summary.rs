//! Bounded-memory statistics over a dump, without building timelines.

use std::io::BufRead;

use serde::Serialize;

use crate::error::TraceResult;
use crate::parser::{DumpEvent, DumpParser, ParseOptions};
use crate::time::Timescale;

/// Per-signal line of a [`TraceSummary`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignalSummary {
    /// Full dotted name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Declared variable type.
    pub var_type: String,
    /// Identifier code as written in the dump.
    pub code: String,
    /// Number of value changes in the body, the initial dump included.
    pub changes: u64,
}

/// Statistics gathered by [`summarize`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    /// Duration of one tick.
    pub timescale: Timescale,
    /// `$date` text.
    pub date: Option<String>,
    /// `$version` text.
    pub version: Option<String>,
    /// Number of distinct identifier codes.
    pub code_count: usize,
    /// Number of `$scope` declarations.
    pub scope_count: usize,
    /// Number of `#` markers in the body.
    pub timestamp_count: u64,
    /// Number of value-change lines in the body.
    pub change_count: u64,
    /// Last timestamp.
    pub max_time: u64,
    /// XXH3-128 of the dump's bytes, as hex.
    pub content_hash: String,
    /// Declared signals in declaration order.
    pub signals: Vec<SignalSummary>,
}

/// Streams a dump once and counts what it contains.
///
/// Memory use is bounded by the header and the longest line, whatever the
/// length of the body.
///
/// # Errors
///
/// Returns the first parse error.
pub fn summarize<R: BufRead>(reader: R, options: ParseOptions) -> TraceResult<TraceSummary> {
    summarize_parser(DumpParser::new(reader, options)?)
}

/// Drains an already opened parser into a [`TraceSummary`].
pub fn summarize_parser<R: BufRead>(mut parser: DumpParser<R>) -> TraceResult<TraceSummary> {
    let mut per_code = vec![0u64; parser.header().code_count()];
    let mut timestamp_count = 0;
    let mut change_count = 0;
    let mut max_time = 0;
    for event in &mut parser {
        match event? {
            DumpEvent::Time { time, .. } => {
                timestamp_count += 1;
                max_time = max_time.max(time);
            }
            DumpEvent::Change(change) => {
                change_count += 1;
                if let Some(n) = per_code.get_mut(change.code.as_raw() as usize) {
                    *n += 1;
                }
            }
        }
    }

    let header = parser.header();
    let signals = header
        .signals
        .iter()
        .map(|s| {
            let changes = header
                .code(&s.code)
                .and_then(|c| per_code.get(c.as_raw() as usize).copied())
                .unwrap_or(0);
            SignalSummary {
                name: s.full_name(),
                width: s.width,
                var_type: s.var_type.clone(),
                code: s.code.clone(),
                changes,
            }
        })
        .collect();

    Ok(TraceSummary {
        timescale: header.timescale,
        date: header.date.clone(),
        version: header.version.clone(),
        code_count: header.code_count(),
        scope_count: header.scopes.len(),
        timestamp_count,
        change_count,
        max_time,
        content_hash: parser.content_hash().to_string(),
        signals,
    })
}
