//! Point lookups and the flattened change table.

use std::collections::BTreeMap;

use serde::Serialize;
use verisim_common::LogicVec;

use crate::error::{TraceError, TraceResult};
use crate::signal::{SignalId, TraceHeader};
use crate::timeline::{Timeline, TimelineBuilder};
use crate::trace::Trace;

/// One signal's value at a [`TimeStep`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignalChange {
    /// The signal that changed.
    pub signal: SignalId,
    /// Its value from this step on.
    pub value: LogicVec,
}

/// All changes that happen at one tick, in selection order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeStep {
    /// The tick.
    pub time: u64,
    /// Changes at this tick.
    pub changes: Vec<SignalChange>,
}

impl Trace {
    /// Returns the value of `id` at `time`.
    ///
    /// At a segment boundary the value of the segment starting at `time`
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::TimeOutOfRange`] when `time > max_time`, and
    /// [`TraceError::UnknownSignal`] for an ID the trace does not contain.
    pub fn value_at(&self, id: SignalId, time: u64) -> TraceResult<&LogicVec> {
        let timeline = self.timeline_or_err(id)?;
        if time > self.max_time() {
            return Err(TraceError::TimeOutOfRange {
                time,
                max_time: self.max_time(),
            });
        }
        timeline.value_at(time).ok_or(TraceError::TimeOutOfRange {
            time,
            max_time: self.max_time(),
        })
    }

    /// Resolves a signal name.
    ///
    /// Accepts a full dotted name (`test.dut.count`), or a bare name when
    /// exactly one signal carries it.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::UnknownSignal`] when nothing matches or a bare
    /// name is ambiguous.
    pub fn lookup(&self, name: &str) -> TraceResult<SignalId> {
        if let Some(s) = self.signals().iter().find(|s| s.full_name() == name) {
            return Ok(s.id);
        }
        let mut leaves = self.signals().iter().filter(|s| s.name == name);
        match (leaves.next(), leaves.next()) {
            (Some(s), None) => Ok(s.id),
            _ => Err(TraceError::UnknownSignal {
                name: name.to_string(),
            }),
        }
    }

    /// Resolves a list of names, or selects every signal when `names` is
    /// empty.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> TraceResult<Vec<SignalId>> {
        if names.is_empty() {
            return Ok(self.signals().iter().map(|s| s.id).collect());
        }
        names.iter().map(|n| self.lookup(n.as_ref())).collect()
    }

    /// Returns every change point of the selected signals in time order.
    ///
    /// Time 0 carries each selected signal's initial value, undefined ones
    /// included, so [`replay`] of the result with this trace's `max_time`
    /// rebuilds the selected timelines exactly.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::UnknownSignal`] for an ID the trace does not
    /// contain.
    pub fn flatten(&self, selection: &[SignalId]) -> TraceResult<Vec<TimeStep>> {
        let mut steps: BTreeMap<u64, Vec<SignalChange>> = BTreeMap::new();
        for &id in selection {
            for segment in self.timeline_or_err(id)?.segments() {
                steps.entry(segment.start).or_default().push(SignalChange {
                    signal: id,
                    value: segment.value.clone(),
                });
            }
        }
        Ok(steps
            .into_iter()
            .map(|(time, changes)| TimeStep { time, changes })
            .collect())
    }

    fn timeline_or_err(&self, id: SignalId) -> TraceResult<&Timeline> {
        self.timeline(id).ok_or_else(|| TraceError::UnknownSignal {
            name: format!("#{}", id.as_raw()),
        })
    }
}

/// Rebuilds timelines from a flattened change table.
///
/// Signals absent from `steps` come back undefined over `[0, max_time]`.
pub fn replay(header: &TraceHeader, steps: &[TimeStep], max_time: u64) -> TraceResult<Vec<Timeline>> {
    let mut builder = TimelineBuilder::new(header);
    for step in steps {
        for change in &step.changes {
            builder.record(change.signal, step.time, change.value.clone())?;
        }
    }
    builder.observe_time(max_time);
    builder.finish()
}
