//! Waveform-trace engine for value-change dumps.
//!
//! The engine runs in three phases, each a function of immutable inputs:
//!
//! 1. [`DumpParser`] streams a dump: it reads the declarations eagerly and
//!    yields body events lazily.
//! 2. [`TimelineBuilder`] folds those events into per-signal
//!    [`Timeline`]s; [`Trace::build`] drives both and returns an immutable
//!    [`Trace`].
//! 3. A trace is then projected onto a window for drawing
//!    ([`Trace::project`]), queried point-wise ([`Trace::value_at`]), or
//!    flattened into a change table ([`Trace::flatten`]) and exported.
//!
//! [`summarize`] is the bounded-memory alternative to phase 2 for callers
//! that only need counts.

#![warn(missing_docs)]

pub mod error;
pub mod export;
mod lexer;
pub mod parser;
pub mod project;
pub mod query;
pub mod signal;
pub mod summary;
pub mod time;
pub mod timeline;
pub mod trace;

pub use error::{ErrorKind, ErrorReport, TraceError, TraceResult};
pub use export::{write_csv, write_json};
pub use parser::{open_dump, DumpEvent, DumpParser, ParseOptions, ValueChangeEvent};
pub use project::{DrawnValue, ProjectedSignal, Projection, VisibleSegment, Window};
pub use query::{replay, SignalChange, TimeStep};
pub use signal::{IdCode, ScopeDecl, Signal, SignalId, TraceHeader};
pub use summary::{summarize, summarize_parser, SignalSummary, TraceSummary};
pub use time::{TimeUnit, Timescale};
pub use timeline::{Timeline, TimelineBuilder, TimelineSegment};
pub use trace::Trace;
