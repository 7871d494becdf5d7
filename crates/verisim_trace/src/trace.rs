//! The immutable, fully built trace of one dump.

use std::io::BufRead;
use std::path::Path;

use verisim_common::ContentHash;

use crate::error::TraceResult;
use crate::parser::{open_dump, DumpParser, ParseOptions};
use crate::signal::{Signal, SignalId, TraceHeader};
use crate::time::Timescale;
use crate::timeline::{Timeline, TimelineBuilder};

/// Every signal's timeline over `[0, max_time]`, plus the dump's header.
///
/// A `Trace` owns all its data and is never mutated after construction, so
/// it can be shared across threads behind a reference or an `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    header: TraceHeader,
    timelines: Vec<Timeline>,
    max_time: u64,
    source_hash: ContentHash,
}

impl Trace {
    /// Drains `parser` and builds the trace.
    ///
    /// # Errors
    ///
    /// Returns the first parse error, or a
    /// [`TraceError::BuilderInvariantViolation`](crate::TraceError::BuilderInvariantViolation).
    /// No partial trace is produced.
    pub fn build<R: BufRead>(mut parser: DumpParser<R>) -> TraceResult<Self> {
        let header = parser.header().clone();
        let mut builder = TimelineBuilder::new(&header);
        for event in &mut parser {
            builder.apply(&event?)?;
        }
        let max_time = builder.max_time();
        let timelines = builder.finish()?;
        let trace = Self {
            header,
            timelines,
            max_time,
            source_hash: parser.content_hash(),
        };
        log::debug!(
            "built trace: {} signals, max time {}, {} segments",
            trace.signals().len(),
            trace.max_time,
            trace.segment_count()
        );
        Ok(trace)
    }

    /// Parses and builds a trace from a reader.
    pub fn from_reader<R: BufRead>(reader: R, options: ParseOptions) -> TraceResult<Self> {
        Self::build(DumpParser::new(reader, options)?)
    }

    /// Parses and builds a trace from a dump file (`.gz` is decompressed).
    pub fn open(path: &Path, options: ParseOptions) -> TraceResult<Self> {
        Self::build(open_dump(path, options)?)
    }

    /// The dump's declarations.
    pub fn header(&self) -> &TraceHeader {
        &self.header
    }

    /// Duration of one tick.
    pub fn timescale(&self) -> Timescale {
        self.header.timescale
    }

    /// Declared signals in declaration order.
    pub fn signals(&self) -> &[Signal] {
        &self.header.signals
    }

    /// Returns the signal with the given ID.
    pub fn signal(&self, id: SignalId) -> Option<&Signal> {
        self.header.signal(id)
    }

    /// Returns the timeline of the given signal.
    pub fn timeline(&self, id: SignalId) -> Option<&Timeline> {
        self.timelines.get(id.index())
    }

    /// The last timestamp seen anywhere in the dump.
    pub fn max_time(&self) -> u64 {
        self.max_time
    }

    /// XXH3-128 hash of the dump's bytes.
    pub fn source_hash(&self) -> ContentHash {
        self.source_hash
    }

    /// Total number of segments across all timelines.
    pub fn segment_count(&self) -> usize {
        self.timelines.iter().map(|t| t.segments().len()).sum()
    }

    /// Iterates over signals paired with their timelines.
    pub fn iter(&self) -> impl Iterator<Item = (&Signal, &Timeline)> {
        self.header.signals.iter().zip(&self.timelines)
    }
}
