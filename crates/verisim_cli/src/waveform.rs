//! Text rendering of a projection using box-drawing characters.
//!
//! Single-bit signals use 2-row traces with corner characters at edges,
//! while multi-bit buses are one row of `═` with `╫` at transitions and the
//! value label after each one. Unknown and high-impedance stretches are
//! drawn with their own fill so they never look like a driven 0.
//!
//! ```text
//!              0 ns        10 ns       20 ns
//! test.clk     ────┐   ┌───┐   ┌───
//!                  └───┘   └───┘
//! test.count   ╳╳╳╳╳╳╫1══════╫2═════
//! ```

use verisim_trace::{DrawnValue, ProjectedSignal, Projection, Timescale, VisibleSegment, Window};

/// Fill for a fully defined bus.
const BUS: char = '\u{2550}'; // ═
/// Fill for a bus with unknown bits.
const UNKNOWN: char = '\u{2573}'; // ╳
/// Fill for a floating signal.
const FLOATING: char = '\u{2504}'; // ┄
/// Bus transition marker.
const BUS_EDGE: char = '\u{256B}'; // ╫
/// Horizontal level line.
const LEVEL: char = '\u{2500}'; // ─
/// Vertical edge into or out of an undriven level.
const EDGE: char = '\u{2502}'; // │

/// Renders `projection` into `columns` characters per line.
///
/// The first line is a time ruler. Each single-bit signal takes two lines
/// and each bus one; the name column is at most a third of the width.
pub fn render_text(projection: &Projection, timescale: Timescale, columns: u16) -> String {
    let columns = usize::from(columns);
    let longest = projection
        .signals
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);
    let name_width = longest.min(columns / 3);
    let wave_width = columns.saturating_sub(name_width + 1).max(1);

    let mut out = String::new();
    push_line(&mut out, "", name_width, &ruler(projection.window, timescale, wave_width));
    for row in &projection.signals {
        let name = truncate(&row.name, name_width);
        if projection.window.is_empty() {
            push_line(&mut out, &name, name_width, &[]);
        } else if row.width == 1 {
            let [top, bottom] = bit_rows(row, projection.window, wave_width);
            push_line(&mut out, &name, name_width, &top);
            push_line(&mut out, "", name_width, &bottom);
        } else {
            push_line(&mut out, &name, name_width, &bus_row(row, projection.window, wave_width));
        }
    }
    out
}

fn push_line(out: &mut String, name: &str, name_width: usize, wave: &[char]) {
    out.push_str(name);
    for _ in name.chars().count()..name_width {
        out.push(' ');
    }
    out.push(' ');
    out.extend(wave.iter());
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

fn truncate(name: &str, width: usize) -> String {
    let count = name.chars().count();
    if count <= width {
        return name.to_string();
    }
    // Keep the leaf end of a long hierarchical name.
    let skip = count - width;
    name.chars().skip(skip).collect()
}

/// Returns the first tick drawn in column `col`.
fn col_to_time(window: Window, col: usize, width: usize) -> u64 {
    let offset = u128::from(window.len()) * col as u128 / width as u128;
    window.start + offset as u64
}

/// Returns the column a tick falls in, if it is inside the window.
fn time_to_col(window: Window, time: u64, width: usize) -> Option<usize> {
    if time < window.start || time >= window.end {
        return None;
    }
    let offset = u128::from(time - window.start) * width as u128 / u128::from(window.len());
    Some(offset as usize)
}

fn segment_at(segments: &[VisibleSegment], time: u64) -> Option<&VisibleSegment> {
    let idx = segments.partition_point(|s| s.start <= time).checked_sub(1)?;
    segments.get(idx)
}

fn ruler(window: Window, timescale: Timescale, width: usize) -> Vec<char> {
    let mut line = vec![' '; width];
    if window.is_empty() {
        return line;
    }
    let end_label = timescale.format_ticks(col_to_time(window, width - 1, width));
    let max_label_width = end_label.chars().count() + 2;
    let num_ticks = (width / max_label_width).clamp(1, 12);

    let mut last_label_end = 0;
    for i in 0..num_ticks {
        let col = i * width / num_ticks;
        if col < last_label_end && i > 0 {
            line[col] = '|';
            continue;
        }
        let label = timescale.format_ticks(col_to_time(window, col, width));
        for (j, ch) in label.chars().enumerate() {
            if let Some(cell) = line.get_mut(col + j) {
                *cell = ch;
            }
        }
        last_label_end = col + label.chars().count() + 1;
    }
    line
}

fn bit_rows(row: &ProjectedSignal, window: Window, width: usize) -> [Vec<char>; 2] {
    let mut top = vec![' '; width];
    let mut bottom = vec![' '; width];
    let mut prev: Option<&DrawnValue> = None;
    for col in 0..width {
        let time = col_to_time(window, col, width);
        let cur = segment_at(&row.segments, time).map(|s| &s.drawn);
        let changed = matches!((prev, cur), (Some(p), Some(c)) if p != c);
        let (t, b) = match cur {
            Some(DrawnValue::High) if changed && prev == Some(&DrawnValue::Low) => ('\u{250C}', '\u{2518}'), // ┌ ┘
            Some(DrawnValue::Low) if changed && prev == Some(&DrawnValue::High) => ('\u{2510}', '\u{2514}'), // ┐ └
            _ if changed => (EDGE, EDGE),
            Some(DrawnValue::High) => (LEVEL, ' '),
            Some(DrawnValue::Low) => (' ', LEVEL),
            Some(DrawnValue::Unknown(_)) => ('X', 'X'),
            Some(DrawnValue::HighImpedance(_)) => ('Z', 'Z'),
            Some(DrawnValue::Bus(_)) | None => ('\u{00B7}', '\u{00B7}'), // ·
        };
        top[col] = t;
        bottom[col] = b;
        prev = cur;
    }
    [top, bottom]
}

fn bus_row(row: &ProjectedSignal, window: Window, width: usize) -> Vec<char> {
    let mut line = vec![' '; width];
    for (col, cell) in line.iter_mut().enumerate() {
        let time = col_to_time(window, col, width);
        *cell = match segment_at(&row.segments, time).map(|s| &s.drawn) {
            Some(DrawnValue::Bus(_)) => BUS,
            Some(DrawnValue::Unknown(_)) => UNKNOWN,
            Some(DrawnValue::HighImpedance(_)) => FLOATING,
            Some(DrawnValue::Low | DrawnValue::High) | None => ' ',
        };
    }

    // Each label starts one column after its segment's left edge and stops
    // before the next transition marker.
    let mut edges: Vec<usize> = row
        .transitions
        .iter()
        .filter_map(|&t| time_to_col(window, t, width))
        .collect();
    edges.dedup();
    for &col in &edges {
        line[col] = BUS_EDGE;
    }

    let mut last_label_end = 0;
    for seg in &row.segments {
        let Some(label) = seg.drawn.label() else {
            continue;
        };
        let Some(edge) = time_to_col(window, seg.start, width) else {
            continue;
        };
        let start = if seg.start == window.start { edge } else { edge + 1 };
        if start < last_label_end {
            continue;
        }
        let stop = edges.iter().copied().find(|&c| c > edge).unwrap_or(width);
        let mut col = start;
        for ch in label.chars() {
            if col >= stop {
                break;
            }
            line[col] = ch;
            col += 1;
        }
        last_label_end = col;
    }
    line
}
