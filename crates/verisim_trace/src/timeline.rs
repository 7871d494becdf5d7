//! Per-signal value intervals and the builder that produces them.
//!
//! A [`Timeline`] is an ordered list of [`TimelineSegment`]s that partition
//! `[0, max_time]`: every segment ends where the next one starts, and the
//! last one is closed at `max_time`. Adjacent segments always hold different
//! values.

use verisim_common::LogicVec;

use crate::error::{TraceError, TraceResult};
use crate::parser::{DumpEvent, ValueChangeEvent};
use crate::signal::{SignalId, TraceHeader};

/// A signal holding one value over `[start, end)`.
///
/// The last segment of a timeline is closed: it covers `[start, end]` with
/// `end == max_time`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineSegment {
    /// First tick holding `value`.
    pub start: u64,
    /// Tick at which the next segment starts, or `max_time` for the last one.
    pub end: u64,
    /// The value held.
    pub value: LogicVec,
}

impl TimelineSegment {
    /// Returns the segment's length in ticks.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true for a zero-length segment (only possible at `max_time`).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The complete history of one signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    segments: Vec<TimelineSegment>,
}

impl Timeline {
    /// Returns the segments in time order.
    pub fn segments(&self) -> &[TimelineSegment] {
        &self.segments
    }

    /// Returns the index of the segment containing `time`.
    ///
    /// At a boundary this is the segment starting at `time`. Times past the
    /// end resolve to the last segment.
    pub fn segment_index_at(&self, time: u64) -> usize {
        self.segments
            .partition_point(|s| s.start <= time)
            .saturating_sub(1)
    }

    /// Returns the value held at `time`, or `None` past the last segment.
    pub fn value_at(&self, time: u64) -> Option<&LogicVec> {
        let last = self.segments.last()?;
        if time > last.end {
            return None;
        }
        Some(&self.segments[self.segment_index_at(time)].value)
    }

    /// Returns the number of value changes after the initial value.
    pub fn change_count(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

/// Folds value changes into per-signal [`Timeline`]s.
///
/// Every signal starts as all-`X` at time 0. A change at the same tick as
/// the current segment's start replaces its value (last write wins); a
/// change to the value already held is ignored.
pub struct TimelineBuilder<'h> {
    header: &'h TraceHeader,
    /// Per signal: `(start, value)` of each segment, ordered.
    starts: Vec<Vec<(u64, LogicVec)>>,
    max_time: u64,
}

impl<'h> TimelineBuilder<'h> {
    /// Creates a builder for the signals declared in `header`.
    pub fn new(header: &'h TraceHeader) -> Self {
        let starts = header
            .signals
            .iter()
            .map(|s| vec![(0, LogicVec::undefined(s.width))])
            .collect();
        Self {
            header,
            starts,
            max_time: 0,
        }
    }

    /// Returns the largest time observed so far.
    pub fn max_time(&self) -> u64 {
        self.max_time
    }

    /// Extends the observed range to include `time`.
    pub fn observe_time(&mut self, time: u64) {
        self.max_time = self.max_time.max(time);
    }

    /// Applies one parser event.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::BuilderInvariantViolation`] if the event would
    /// break the ordering or width of a timeline.
    pub fn apply(&mut self, event: &DumpEvent) -> TraceResult<()> {
        match event {
            DumpEvent::Time { time, .. } => {
                self.observe_time(*time);
                Ok(())
            }
            DumpEvent::Change(change) => self.apply_change(change),
        }
    }

    /// Applies a value change to every signal bound to its code.
    pub fn apply_change(&mut self, change: &ValueChangeEvent) -> TraceResult<()> {
        let header = self.header;
        for &id in header.signals_with_code(change.code) {
            self.record(id, change.time, change.value.clone())?;
        }
        Ok(())
    }

    /// Records that `id` takes `value` from `time` on.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::BuilderInvariantViolation`] for an unknown
    /// signal, a width mismatch, or a time before the signal's last change.
    pub fn record(&mut self, id: SignalId, time: u64, value: LogicVec) -> TraceResult<()> {
        let header = self.header;
        let Some(signal) = header.signal(id) else {
            return Err(TraceError::BuilderInvariantViolation {
                signal: format!("#{}", id.as_raw()),
                message: "signal is not declared".to_string(),
            });
        };
        if value.width() != signal.width {
            return Err(violation(
                header,
                id,
                format!("{}-bit value for a {}-bit signal", value.width(), signal.width),
            ));
        }
        let Some(starts) = self.starts.get_mut(id.index()) else {
            return Err(violation(header, id, "no timeline for signal".to_string()));
        };
        let Some(last) = starts.last_mut() else {
            return Err(violation(header, id, "timeline has no initial segment".to_string()));
        };
        if time < last.0 {
            return Err(violation(
                header,
                id,
                format!("change at {time} precedes segment start {}", last.0),
            ));
        }
        if time == last.0 {
            last.1 = value;
            let n = starts.len();
            if n >= 2 && starts[n - 2].1 == starts[n - 1].1 {
                starts.pop();
            }
        } else if last.1 != value {
            starts.push((time, value));
        }
        self.observe_time(time);
        Ok(())
    }

    /// Closes every timeline at the largest observed time and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::BuilderInvariantViolation`] if any timeline does
    /// not partition `[0, max_time]` into maximal segments.
    pub fn finish(self) -> TraceResult<Vec<Timeline>> {
        let max_time = self.max_time;
        let header = self.header;
        let mut timelines = Vec::with_capacity(self.starts.len());
        for (index, starts) in self.starts.into_iter().enumerate() {
            let id = SignalId::from_raw(index as u32);
            let mut segments: Vec<TimelineSegment> = Vec::with_capacity(starts.len());
            let mut iter = starts.into_iter().peekable();
            while let Some((start, value)) = iter.next() {
                let end = iter.peek().map_or(max_time, |(next, _)| *next);
                segments.push(TimelineSegment { start, end, value });
            }
            validate(header, id, &segments, max_time)?;
            timelines.push(Timeline { segments });
        }
        Ok(timelines)
    }
}

fn violation(header: &TraceHeader, id: SignalId, message: String) -> TraceError {
    let signal = header
        .signal(id)
        .map_or_else(|| format!("#{}", id.as_raw()), |s| s.full_name());
    TraceError::BuilderInvariantViolation { signal, message }
}

fn validate(
    header: &TraceHeader,
    id: SignalId,
    segments: &[TimelineSegment],
    max_time: u64,
) -> TraceResult<()> {
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return Err(violation(header, id, "timeline is empty".to_string()));
    };
    if first.start != 0 {
        return Err(violation(
            header,
            id,
            format!("first segment starts at {}", first.start),
        ));
    }
    if last.end != max_time || last.start > last.end {
        return Err(violation(
            header,
            id,
            format!("last segment [{}, {}] does not close at {max_time}", last.start, last.end),
        ));
    }
    for pair in segments.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.end != b.start || a.start >= a.end {
            return Err(violation(
                header,
                id,
                format!("segments [{}, {}) and [{}, ..) are not contiguous", a.start, a.end, b.start),
            ));
        }
        if a.value == b.value {
            return Err(violation(
                header,
                id,
                format!("adjacent segments at {} hold the same value", b.start),
            ));
        }
    }
    Ok(())
}
