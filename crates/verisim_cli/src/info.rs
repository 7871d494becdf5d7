//! Implementation of the `verisim info` command.
//!
//! Streams the dump once through the summarizer, so it works on dumps too
//! large to build timelines for.

use std::fmt::Write as _;

use verisim_trace::{open_dump, summarize_parser, TraceSummary};

use crate::pipeline::{check_dump_path, load_settings, parse_options};
use crate::{GlobalArgs, InfoArgs, ReportFormat};

/// Runs the `verisim info` command.
pub fn run(args: &InfoArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_settings(global)?;
    let path = check_dump_path(&args.dump)?;
    let parser = open_dump(path, parse_options(&config))?;
    let summary = summarize_parser(parser)?;

    match args.format {
        ReportFormat::Text => print!("{}", format_summary(&args.dump, &summary)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(0)
}

/// Renders a summary as aligned text.
fn format_summary(dump: &str, summary: &TraceSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{dump}");
    if let Some(version) = &summary.version {
        let _ = writeln!(out, "  version:    {version}");
    }
    if let Some(date) = &summary.date {
        let _ = writeln!(out, "  date:       {date}");
    }
    let _ = writeln!(out, "  timescale:  {}", summary.timescale);
    let _ = writeln!(
        out,
        "  end time:   {} ({})",
        summary.max_time,
        summary.timescale.format_ticks(summary.max_time)
    );
    let _ = writeln!(
        out,
        "  signals:    {} ({} codes, {} scopes)",
        summary.signals.len(),
        summary.code_count,
        summary.scope_count
    );
    let _ = writeln!(
        out,
        "  changes:    {} over {} timestamps",
        summary.change_count, summary.timestamp_count
    );
    let _ = writeln!(out, "  hash:       {}", summary.content_hash);

    if summary.signals.is_empty() {
        return out;
    }
    let name_width = summary
        .signals
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0);
    let _ = writeln!(out);
    for s in &summary.signals {
        let _ = writeln!(
            out,
            "  {:<name_width$}  {:>4}  {:<8} {:>8} changes",
            s.name, s.width, s.var_type, s.changes
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use verisim_trace::{summarize, ParseOptions};

    const DUMP: &str = "\
$date today $end
$timescale 10ps $end
$scope module top $end
$var wire 1 ! clk $end
$var reg 8 \" data $end
$upscope $end
$enddefinitions $end
#0
0!
b0 \"
#100
1!
#200
";

    fn summary() -> TraceSummary {
        let options = ParseOptions {
            extend_short_vectors: true,
        };
        summarize(DUMP.as_bytes(), options).unwrap()
    }

    #[test]
    fn text_summary_lists_header_and_signals() {
        let text = format_summary("run.vcd", &summary());
        assert!(text.starts_with("run.vcd\n"));
        assert!(text.contains("date:       today"));
        assert!(text.contains("timescale:  10ps"));
        assert!(text.contains("end time:   200 (2 ns)"));
        assert!(text.contains("signals:    2 (2 codes, 1 scopes)"));
        assert!(text.contains("changes:    3 over 3 timestamps"));
        assert!(text.contains("top.clk"));
        assert!(text.contains("top.data"));
        assert!(!text.contains("version:"));
    }

    #[test]
    fn run_reports_missing_file() {
        let args = InfoArgs {
            dump: "/nonexistent/run.vcd".to_string(),
            format: ReportFormat::Text,
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        };
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }
}
