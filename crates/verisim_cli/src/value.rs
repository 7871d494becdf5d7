//! Implementation of the `verisim value` command.

use verisim_common::Radix;
use verisim_trace::Trace;

use crate::pipeline::{load_settings, load_trace, parse_time};
use crate::{GlobalArgs, ValueArgs};

/// Runs the `verisim value` command.
pub fn run(args: &ValueArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_settings(global)?;
    let trace = load_trace(&args.dump, &config, global)?;
    let radix = args.radix.map(Radix::from).unwrap_or(config.render.radix);
    println!("{}", query(&trace, &args.signal, &args.time, radix)?);
    Ok(0)
}

/// Looks up `signal` at `time` and formats the value in `radix`.
fn query(
    trace: &Trace,
    signal: &str,
    time: &str,
    radix: Radix,
) -> Result<String, Box<dyn std::error::Error>> {
    let id = trace.lookup(signal)?;
    let ticks = parse_time(time, trace.timescale())?;
    let value = trace.value_at(id, ticks)?;
    log::debug!("{signal} at tick {ticks}: {value}");
    Ok(value.format_radix(radix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RadixArg;
    use verisim_trace::ParseOptions;

    const DUMP: &str = "\
$timescale 1ns $end
$scope module top $end
$var wire 1 ! clk $end
$var reg 8 \" data $end
$upscope $end
$enddefinitions $end
#0
$dumpvars
0!
bxxxxxxxx \"
$end
#10
1!
b00101010 \"
#20
bzzzzzzzz \"
#30
";

    fn trace() -> Trace {
        Trace::from_reader(DUMP.as_bytes(), ParseOptions::default()).unwrap()
    }

    #[test]
    fn value_in_each_radix() {
        let t = trace();
        assert_eq!(query(&t, "data", "15", Radix::Hex).unwrap(), "2a");
        assert_eq!(query(&t, "data", "15ns", Radix::Decimal).unwrap(), "42");
        assert_eq!(query(&t, "top.data", "10", Radix::Binary).unwrap(), "00101010");
    }

    #[test]
    fn boundary_takes_new_value() {
        let t = trace();
        assert_eq!(query(&t, "clk", "9", Radix::Hex).unwrap(), "0");
        assert_eq!(query(&t, "clk", "10", Radix::Hex).unwrap(), "1");
    }

    #[test]
    fn unknown_and_floating_values() {
        let t = trace();
        assert_eq!(query(&t, "data", "0", Radix::Hex).unwrap(), "XX");
        assert_eq!(query(&t, "data", "30", Radix::Hex).unwrap(), "ZZ");
    }

    #[test]
    fn errors_are_reported() {
        let t = trace();
        let err = query(&t, "nope", "0", Radix::Hex).unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(query(&t, "data", "31", Radix::Hex).is_err());
        assert!(query(&t, "data", "1 fortnight", Radix::Hex).is_err());
    }

    #[test]
    fn run_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.vcd");
        std::fs::write(&path, DUMP).unwrap();
        let args = ValueArgs {
            dump: path.to_string_lossy().into_owned(),
            signal: "data".to_string(),
            time: "20ns".to_string(),
            radix: Some(RadixArg::Binary),
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
    }
}
