//! Projection of a trace onto a time window for drawing.
//!
//! [`Trace::project`] clips the selected timelines to a half-open window
//! `[start, end)` and tags each visible segment with a [`DrawnValue`]: a
//! level for single-bit signals, a labelled block for buses. Unknown and
//! high-impedance values keep their own tags so they are never drawn as 0.

use rayon::prelude::*;
use serde::Serialize;
use verisim_common::{Logic, LogicVec, Radix};

use crate::error::{TraceError, TraceResult};
use crate::signal::SignalId;
use crate::trace::Trace;

/// A half-open time range `[start, end)` in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Window {
    /// First visible tick.
    pub start: u64,
    /// First tick past the window.
    pub end: u64,
}

impl Window {
    /// Creates a window.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Returns the number of ticks covered.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true for a zero-width window.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How one visible segment is drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DrawnValue {
    /// Single-bit `0`.
    Low,
    /// Single-bit `1`.
    High,
    /// Any `X` bit, or a bus mixing `Z` with other symbols.
    Unknown(String),
    /// All bits `Z`.
    HighImpedance(String),
    /// Fully defined multi-bit value with its label.
    Bus(String),
}

impl DrawnValue {
    /// Classifies a value, labelling buses in `radix`.
    pub fn classify(value: &LogicVec, radix: Radix) -> Self {
        if value.width() == 1 {
            return match value.get(0) {
                Logic::Zero => DrawnValue::Low,
                Logic::One => DrawnValue::High,
                Logic::X => DrawnValue::Unknown("X".to_string()),
                Logic::Z => DrawnValue::HighImpedance("Z".to_string()),
            };
        }
        let text = value.format_radix(radix);
        if value.is_fully_defined() {
            DrawnValue::Bus(text)
        } else if (0..value.width()).all(|i| value.get(i) == Logic::Z) {
            DrawnValue::HighImpedance(text)
        } else {
            DrawnValue::Unknown(text)
        }
    }

    /// Returns the label drawn inside a bus block, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            DrawnValue::Low | DrawnValue::High => None,
            DrawnValue::Unknown(s) | DrawnValue::HighImpedance(s) | DrawnValue::Bus(s) => Some(s),
        }
    }
}

/// A segment clipped to the window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VisibleSegment {
    /// Visible start, at least the window start.
    pub start: u64,
    /// Visible end, at most the window end.
    pub end: u64,
    /// The underlying value, unchanged by clipping.
    pub value: LogicVec,
    /// How the value is drawn.
    pub drawn: DrawnValue,
}

/// One selected signal's row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectedSignal {
    /// The signal.
    pub signal: SignalId,
    /// Its full dotted name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Visible segments in time order.
    pub segments: Vec<VisibleSegment>,
    /// Ticks strictly inside the window where the value changes.
    pub transitions: Vec<u64>,
}

/// The result of projecting a trace onto a window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// The projected window.
    pub window: Window,
    /// One row per selected signal, in selection order.
    pub signals: Vec<ProjectedSignal>,
}

impl Trace {
    /// Clips the selected signals to `window`.
    ///
    /// A zero-width window yields rows with no segments; an empty selection
    /// yields no rows.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::InvalidWindow`] if `window.start > window.end`
    /// or `window.end > max_time`, and [`TraceError::UnknownSignal`] for an
    /// ID the trace does not contain.
    pub fn project(
        &self,
        window: Window,
        selection: &[SignalId],
        radix: Radix,
    ) -> TraceResult<Projection> {
        if window.start > window.end || window.end > self.max_time() {
            return Err(TraceError::InvalidWindow {
                start: window.start,
                end: window.end,
                max_time: self.max_time(),
            });
        }
        let signals = selection
            .par_iter()
            .map(|&id| self.project_signal(id, window, radix))
            .collect::<TraceResult<Vec<_>>>()?;
        Ok(Projection { window, signals })
    }

    fn project_signal(&self, id: SignalId, window: Window, radix: Radix) -> TraceResult<ProjectedSignal> {
        let unknown = || TraceError::UnknownSignal {
            name: format!("#{}", id.as_raw()),
        };
        let signal = self.signal(id).ok_or_else(unknown)?;
        let timeline = self.timeline(id).ok_or_else(unknown)?;

        let mut segments = Vec::new();
        let mut transitions = Vec::new();
        if !window.is_empty() {
            let first = timeline.segment_index_at(window.start);
            for seg in timeline.segments()[first..]
                .iter()
                .take_while(|s| s.start < window.end)
            {
                if seg.start > window.start {
                    transitions.push(seg.start);
                }
                segments.push(VisibleSegment {
                    start: seg.start.max(window.start),
                    end: seg.end.min(window.end),
                    value: seg.value.clone(),
                    drawn: DrawnValue::classify(&seg.value, radix),
                });
            }
        }

        Ok(ProjectedSignal {
            signal: id,
            name: signal.full_name(),
            width: signal.width,
            segments,
            transitions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;

    const DUMP: &str = "\
$timescale 1ns $end
$scope module test $end
$var reg 1 ! clk $end
$var reg 4 \" count $end
$var wire 8 # bus $end
$upscope $end
$enddefinitions $end
#0
0!
b0000zzzz #
#5
1!
#10
b0001 \"
0!
#20
b0010 \"
bzzzzzzzz #
#30
";

    fn trace() -> Trace {
        Trace::from_reader(DUMP.as_bytes(), ParseOptions::default()).unwrap()
    }

    fn v(s: &str) -> LogicVec {
        LogicVec::from_binary_str(s).unwrap()
    }

    #[test]
    fn window_clips_and_marks_transitions() {
        let t = trace();
        let count = t.lookup("count").unwrap();
        let p = t.project(Window::new(5, 25), &[count], Radix::Hex).unwrap();
        let row = &p.signals[0];
        let spans: Vec<(u64, u64)> = row.segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(spans, vec![(5, 10), (10, 20), (20, 25)]);
        assert_eq!(row.segments[0].drawn, DrawnValue::Unknown("X".to_string()));
        assert_eq!(row.segments[1].drawn, DrawnValue::Bus("1".to_string()));
        assert_eq!(row.segments[2].value, v("0010"));
        assert_eq!(row.transitions, vec![10, 20]);
    }

    #[test]
    fn single_bit_levels() {
        let t = trace();
        let clk = t.lookup("clk").unwrap();
        let p = t.project(Window::new(0, 30), &[clk], Radix::Hex).unwrap();
        let drawn: Vec<&DrawnValue> = p.signals[0].segments.iter().map(|s| &s.drawn).collect();
        assert_eq!(drawn, vec![&DrawnValue::Low, &DrawnValue::High, &DrawnValue::Low]);
        assert_eq!(p.signals[0].transitions, vec![5, 10]);
    }

    #[test]
    fn x_and_z_are_distinct() {
        let t = trace();
        let bus = t.lookup("bus").unwrap();
        let p = t.project(Window::new(0, 30), &[bus], Radix::Hex).unwrap();
        let segs = &p.signals[0].segments;
        assert_eq!(segs[0].drawn, DrawnValue::Unknown("0Z".to_string()));
        assert_eq!(segs[1].drawn, DrawnValue::HighImpedance("ZZ".to_string()));
    }

    #[test]
    fn radix_selects_bus_text() {
        let t = trace();
        let count = t.lookup("count").unwrap();
        let p = t.project(Window::new(10, 20), &[count], Radix::Binary).unwrap();
        assert_eq!(p.signals[0].segments[0].drawn.label(), Some("0001"));
        let p = t.project(Window::new(20, 30), &[count], Radix::Decimal).unwrap();
        assert_eq!(p.signals[0].segments[0].drawn.label(), Some("2"));
    }

    #[test]
    fn window_inside_one_segment_has_no_transitions() {
        let t = trace();
        let count = t.lookup("count").unwrap();
        let p = t.project(Window::new(12, 18), &[count], Radix::Hex).unwrap();
        assert_eq!(p.signals[0].segments.len(), 1);
        assert!(p.signals[0].transitions.is_empty());
    }

    #[test]
    fn zero_width_window_is_empty() {
        let t = trace();
        let count = t.lookup("count").unwrap();
        let p = t.project(Window::new(10, 10), &[count], Radix::Hex).unwrap();
        assert!(p.signals[0].segments.is_empty());
        assert!(p.signals[0].transitions.is_empty());
    }

    #[test]
    fn empty_selection() {
        let p = trace().project(Window::new(0, 30), &[], Radix::Hex).unwrap();
        assert!(p.signals.is_empty());
    }

    #[test]
    fn invalid_windows() {
        let t = trace();
        for (start, end) in [(20, 10), (0, 31)] {
            let err = t.project(Window::new(start, end), &[], Radix::Hex).unwrap_err();
            assert!(matches!(err, TraceError::InvalidWindow { .. }));
        }
    }

    #[test]
    fn selection_order_is_kept() {
        let t = trace();
        let ids = t.select(&["bus", "clk", "count"]).unwrap();
        let p = t.project(Window::new(0, 30), &ids, Radix::Hex).unwrap();
        let names: Vec<&str> = p.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["test.bus", "test.clk", "test.count"]);
    }
}
