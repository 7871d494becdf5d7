//! Error types for trace construction, projection and queries.
//!
//! Parse and build errors ([`ErrorKind::MalformedTrace`],
//! [`ErrorKind::OutOfOrderTime`], [`ErrorKind::UnexpectedEndOfStream`],
//! [`ErrorKind::BuilderInvariantViolation`]) abort trace construction.
//! Projection and query errors only fail the call that raised them.

use std::io;

use serde::Serialize;

/// Errors raised while reading a dump or using a built trace.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The dump violates the value-change-dump grammar.
    #[error("malformed trace at line {line}: {message}")]
    MalformedTrace {
        /// The 1-based line number of the offending token.
        line: usize,
        /// Description of the violation.
        message: String,
    },

    /// A timestamp marker is smaller than the one before it.
    #[error("timestamp #{found} at line {line} precedes earlier timestamp #{previous}")]
    OutOfOrderTime {
        /// The 1-based line number of the offending marker.
        line: usize,
        /// The last accepted timestamp.
        previous: u64,
        /// The decreasing timestamp.
        found: u64,
    },

    /// The stream ended before a construct was complete.
    #[error("unexpected end of stream after line {line}: expected {expected}")]
    UnexpectedEndOfStream {
        /// The last line read (0 for an empty stream).
        line: usize,
        /// What the parser was waiting for.
        expected: String,
    },

    /// The timeline builder produced segments that do not partition the
    /// observed time range. This is a bug, not a user input problem.
    #[error("timeline invariant violated for signal '{signal}': {message}")]
    BuilderInvariantViolation {
        /// Full name of the affected signal.
        signal: String,
        /// Which invariant failed.
        message: String,
    },

    /// A projection window is reversed or extends past the trace.
    #[error("invalid window [{start}, {end}) for trace ending at {max_time}")]
    InvalidWindow {
        /// Requested window start.
        start: u64,
        /// Requested window end.
        end: u64,
        /// The trace's final timestamp.
        max_time: u64,
    },

    /// A query time lies outside `[0, max_time]`.
    #[error("time {time} is outside the trace range [0, {max_time}]")]
    TimeOutOfRange {
        /// The requested time.
        time: u64,
        /// The trace's final timestamp.
        max_time: u64,
    },

    /// A query named a signal the trace does not contain.
    #[error("unknown signal '{name}'")]
    UnknownSignal {
        /// The name or id that failed to resolve.
        name: String,
    },

    /// Reading the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The category of a [`TraceError`], for callers that branch on error class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Grammar violation, undeclared reference or width mismatch.
    MalformedTrace,
    /// Non-monotonic body timestamps.
    OutOfOrderTime,
    /// Truncated input.
    UnexpectedEndOfStream,
    /// Internal consistency failure in the timeline builder.
    BuilderInvariantViolation,
    /// Rejected projection window.
    InvalidWindow,
    /// Query outside the trace's time range or signal set.
    TimeOutOfRange,
    /// Failure of the underlying reader.
    Io,
}

impl TraceError {
    /// Returns the error's category.
    ///
    /// An unknown signal is reported under [`ErrorKind::TimeOutOfRange`]:
    /// both mean the query fell outside what the trace covers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TraceError::MalformedTrace { .. } => ErrorKind::MalformedTrace,
            TraceError::OutOfOrderTime { .. } => ErrorKind::OutOfOrderTime,
            TraceError::UnexpectedEndOfStream { .. } => ErrorKind::UnexpectedEndOfStream,
            TraceError::BuilderInvariantViolation { .. } => ErrorKind::BuilderInvariantViolation,
            TraceError::InvalidWindow { .. } => ErrorKind::InvalidWindow,
            TraceError::TimeOutOfRange { .. } | TraceError::UnknownSignal { .. } => {
                ErrorKind::TimeOutOfRange
            }
            TraceError::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns the source line the error points at, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            TraceError::MalformedTrace { line, .. }
            | TraceError::OutOfOrderTime { line, .. }
            | TraceError::UnexpectedEndOfStream { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Builds the serializable form handed to a presentation layer.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            detail: self.to_string(),
            line: self.line(),
        }
    }

    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        TraceError::MalformedTrace {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn end_of_stream(line: usize, expected: impl Into<String>) -> Self {
        TraceError::UnexpectedEndOfStream {
            line,
            expected: expected.into(),
        }
    }
}

/// Structured, serializable description of a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub detail: String,
    /// Source line, when the error has one.
    pub line: Option<usize>,
}

/// Result alias for trace operations.
pub type TraceResult<T> = Result<T, TraceError>;
