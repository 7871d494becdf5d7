//! Streaming value-change-dump (IEEE 1364 §18) parser.
//!
//! [`DumpParser::new`] reads the declarations section eagerly and returns a
//! parser positioned at the start of the body. The body is then consumed as
//! an [`Iterator`] of [`DumpEvent`]s, one timestamp marker or value change at
//! a time, so a dump of any length is read in bounded memory.
//!
//! The parser is strict: malformed lines, undeclared identifier codes and
//! width mismatches fail with [`TraceError::MalformedTrace`] carrying the
//! offending line. After the first error the iterator is fused.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use verisim_common::{ContentHash, Logic, LogicVec};

use crate::error::{TraceError, TraceResult};
use crate::lexer::{Lexer, Token};
use crate::signal::{IdCode, ScopeDecl, TraceHeader};
use crate::time::Timescale;

/// Parser behaviour switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Left-extend vectors shorter than the declared width (IEEE 1364
    /// §18.2.1) instead of rejecting them.
    pub extend_short_vectors: bool,
}

/// A value change for one identifier code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueChangeEvent {
    /// Tick at which the change happens.
    pub time: u64,
    /// The identifier code that changed. Every alias bound to it changes.
    pub code: IdCode,
    /// New value, exactly as wide as the code's signals.
    pub value: LogicVec,
    /// 1-based source line.
    pub line: usize,
}

/// One item of the dump body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DumpEvent {
    /// A `#<n>` timestamp marker.
    Time {
        /// The new current time in ticks.
        time: u64,
        /// 1-based source line.
        line: usize,
    },
    /// A value change at the current time.
    Change(ValueChangeEvent),
}

/// Boxed reader returned by [`open_dump`].
pub type DumpReader = Box<dyn BufRead + Send>;

/// A dump parser positioned in the body of a dump.
pub struct DumpParser<R> {
    lexer: Lexer<R>,
    header: TraceHeader,
    options: ParseOptions,
    time: u64,
    section: Option<String>,
    done: bool,
}

impl<R: BufRead> DumpParser<R> {
    /// Reads the declarations section of `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::UnexpectedEndOfStream`] when the stream ends
    /// before `$enddefinitions $end`, and [`TraceError::MalformedTrace`] for
    /// any invalid declaration.
    pub fn new(reader: R, options: ParseOptions) -> TraceResult<Self> {
        let mut parser = Self {
            lexer: Lexer::new(reader),
            header: TraceHeader::default(),
            options,
            time: 0,
            section: None,
            done: false,
        };
        parser.parse_header()?;
        log::debug!(
            "parsed dump header: {} signals, {} codes, timescale {}",
            parser.header.signals.len(),
            parser.header.code_count(),
            parser.header.timescale
        );
        Ok(parser)
    }

    /// The declarations read by [`DumpParser::new`].
    pub fn header(&self) -> &TraceHeader {
        &self.header
    }

    /// Hash of the bytes read so far; the whole dump once drained.
    pub fn content_hash(&self) -> ContentHash {
        self.lexer.content_hash()
    }

    fn next_required(&mut self, expected: &str) -> TraceResult<Token> {
        match self.lexer.next_token()? {
            Some(tok) => Ok(tok),
            None => Err(TraceError::end_of_stream(self.lexer.line(), expected)),
        }
    }

    /// Collects the tokens of a `$keyword ... $end` section.
    fn section_body(&mut self, keyword: &str) -> TraceResult<Vec<Token>> {
        let expected = format!("$end closing {keyword}");
        let mut body = Vec::new();
        loop {
            let tok = self.next_required(&expected)?;
            if tok.text == "$end" {
                return Ok(body);
            }
            body.push(tok);
        }
    }

    fn parse_header(&mut self) -> TraceResult<()> {
        let mut scope: Vec<String> = Vec::new();
        loop {
            let tok = self.next_required("$enddefinitions")?;
            match tok.text.as_str() {
                "$enddefinitions" => {
                    let body = self.section_body("$enddefinitions")?;
                    if let Some(extra) = body.first() {
                        return Err(TraceError::malformed(
                            extra.line,
                            format!("unexpected '{}' in $enddefinitions", extra.text),
                        ));
                    }
                    if !scope.is_empty() {
                        return Err(TraceError::malformed(
                            tok.line,
                            format!("scope '{}' is still open at $enddefinitions", scope.join(".")),
                        ));
                    }
                    return Ok(());
                }
                "$scope" => {
                    let body = self.section_body("$scope")?;
                    match body.as_slice() {
                        [kind, name] => {
                            scope.push(name.text.clone());
                            self.header.scopes.push(ScopeDecl {
                                kind: kind.text.clone(),
                                path: scope.clone(),
                            });
                        }
                        _ => {
                            return Err(TraceError::malformed(
                                tok.line,
                                "$scope needs a kind and a name",
                            ))
                        }
                    }
                }
                "$upscope" => {
                    let body = self.section_body("$upscope")?;
                    if !body.is_empty() {
                        return Err(TraceError::malformed(tok.line, "$upscope takes no arguments"));
                    }
                    if scope.pop().is_none() {
                        return Err(TraceError::malformed(tok.line, "$upscope without an open scope"));
                    }
                }
                "$var" => {
                    let body = self.section_body("$var")?;
                    self.declare_var(&body, &scope, tok.line)?;
                }
                "$timescale" => {
                    let body = self.section_body("$timescale")?;
                    let text = join(&body);
                    self.header.timescale = Timescale::parse(&text).ok_or_else(|| {
                        TraceError::malformed(tok.line, format!("invalid timescale '{text}'"))
                    })?;
                }
                "$date" => {
                    let body = self.section_body("$date")?;
                    self.header.date = Some(join(&body));
                }
                "$version" => {
                    let body = self.section_body("$version")?;
                    self.header.version = Some(join(&body));
                }
                "$comment" => {
                    self.section_body("$comment")?;
                }
                keyword if keyword.starts_with('$') && keyword != "$end" => {
                    let keyword = keyword.to_string();
                    log::debug!("skipping unknown declaration {keyword} at line {}", tok.line);
                    self.section_body(&keyword)?;
                }
                other => {
                    return Err(TraceError::malformed(
                        tok.line,
                        format!("unexpected '{other}' in declarations"),
                    ))
                }
            }
        }
    }

    fn declare_var(&mut self, body: &[Token], scope: &[String], line: usize) -> TraceResult<()> {
        let (var_type, width, code, name, range) = match body {
            [t, w, c, n] => (t, w, c, n, None),
            [t, w, c, n, r] if r.text.starts_with('[') => (t, w, c, n, Some(r.text.clone())),
            _ => {
                return Err(TraceError::malformed(
                    line,
                    format!("invalid $var declaration '{}'", join(body)),
                ))
            }
        };
        let width: u32 = match width.text.parse() {
            Ok(w) if w > 0 => w,
            _ => {
                return Err(TraceError::malformed(
                    line,
                    format!("invalid width '{}' for '{}'", width.text, name.text),
                ))
            }
        };
        self.header
            .declare(
                &code.text,
                name.text.clone(),
                scope.to_vec(),
                width,
                var_type.text.clone(),
                range,
            )
            .map_err(|existing| {
                TraceError::malformed(
                    line,
                    format!(
                        "'{}' is {width} bits but code '{}' is already bound to {existing}-bit signals",
                        name.text, code.text
                    ),
                )
            })?;
        Ok(())
    }

    fn resolve(&self, code: &str, line: usize) -> TraceResult<(IdCode, u32)> {
        let id = self.header.code(code).ok_or_else(|| {
            TraceError::malformed(line, format!("undeclared identifier code '{code}'"))
        })?;
        let width = self.header.code_width(id).ok_or_else(|| {
            TraceError::malformed(line, format!("undeclared identifier code '{code}'"))
        })?;
        Ok((id, width))
    }

    fn vector_change(&mut self, tok: Token) -> TraceResult<DumpEvent> {
        let bits = &tok.text[1..];
        let code = self.next_required("identifier code after vector value")?;
        let (id, width) = self.resolve(&code.text, tok.line)?;
        let parsed = LogicVec::from_binary_str(bits).ok_or_else(|| {
            TraceError::malformed(tok.line, format!("invalid vector value '{}'", tok.text))
        })?;
        let len = parsed.width();
        let value = if len == width {
            parsed
        } else if len < width && self.options.extend_short_vectors {
            parsed.left_extend(width)
        } else {
            return Err(TraceError::malformed(
                tok.line,
                format!(
                    "vector '{bits}' has {len} symbols but code '{}' is {width} bits wide",
                    code.text
                ),
            ));
        };
        Ok(DumpEvent::Change(ValueChangeEvent {
            time: self.time,
            code: id,
            value,
            line: tok.line,
        }))
    }

    fn scalar_change(&mut self, tok: Token) -> TraceResult<DumpEvent> {
        let mut chars = tok.text.chars();
        let bit = chars.next().and_then(Logic::from_char).ok_or_else(|| {
            TraceError::malformed(tok.line, format!("invalid scalar change '{}'", tok.text))
        })?;
        let code = chars.as_str();
        if code.is_empty() {
            return Err(TraceError::malformed(
                tok.line,
                format!("missing identifier code in '{}'", tok.text),
            ));
        }
        let (id, width) = self.resolve(code, tok.line)?;
        if width != 1 {
            return Err(TraceError::malformed(
                tok.line,
                format!("scalar change for code '{code}' which is {width} bits wide"),
            ));
        }
        let mut value = LogicVec::new(1);
        value.set(0, bit);
        Ok(DumpEvent::Change(ValueChangeEvent {
            time: self.time,
            code: id,
            value,
            line: tok.line,
        }))
    }

    fn timestamp(&mut self, tok: Token) -> TraceResult<DumpEvent> {
        let digits = &tok.text[1..];
        let invalid = || TraceError::malformed(tok.line, format!("invalid timestamp '{}'", tok.text));
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let found: u64 = digits.parse().map_err(|_| invalid())?;
        if found < self.time {
            return Err(TraceError::OutOfOrderTime {
                line: tok.line,
                previous: self.time,
                found,
            });
        }
        self.time = found;
        Ok(DumpEvent::Time {
            time: found,
            line: tok.line,
        })
    }

    fn keyword(&mut self, tok: Token) -> TraceResult<()> {
        match tok.text.as_str() {
            "$dumpvars" | "$dumpall" | "$dumpon" | "$dumpoff" => {
                if let Some(open) = &self.section {
                    return Err(TraceError::malformed(
                        tok.line,
                        format!("{} inside an unclosed {open}", tok.text),
                    ));
                }
                log::trace!("{} at #{} (line {})", tok.text, self.time, tok.line);
                self.section = Some(tok.text);
                Ok(())
            }
            "$end" => match self.section.take() {
                Some(_) => Ok(()),
                None => Err(TraceError::malformed(tok.line, "$end without an open section")),
            },
            "$comment" => {
                self.section_body("$comment")?;
                Ok(())
            }
            other => Err(TraceError::malformed(
                tok.line,
                format!("unexpected '{other}' in dump body"),
            )),
        }
    }

    fn next_event(&mut self) -> TraceResult<Option<DumpEvent>> {
        loop {
            let Some(tok) = self.lexer.next_token()? else {
                if let Some(open) = &self.section {
                    return Err(TraceError::end_of_stream(
                        self.lexer.line(),
                        format!("$end closing {open}"),
                    ));
                }
                return Ok(None);
            };
            let lead = tok.text.as_bytes()[0];
            let event = match lead {
                b'#' => self.timestamp(tok)?,
                b'$' => {
                    self.keyword(tok)?;
                    continue;
                }
                b'b' | b'B' => self.vector_change(tok)?,
                b'0' | b'1' | b'x' | b'X' | b'z' | b'Z' => self.scalar_change(tok)?,
                b'r' | b'R' | b's' | b'S' => {
                    return Err(TraceError::malformed(
                        tok.line,
                        format!("real and string changes are not supported: '{}'", tok.text),
                    ))
                }
                _ => {
                    return Err(TraceError::malformed(
                        tok.line,
                        format!("unrecognized value change '{}'", tok.text),
                    ))
                }
            };
            return Ok(Some(event));
        }
    }
}

impl<R: BufRead> Iterator for DumpParser<R> {
    type Item = TraceResult<DumpEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Opens a dump file, decompressing it when the name ends in `.gz`.
///
/// # Errors
///
/// Returns [`TraceError::Io`] if the file cannot be opened, or any header
/// error from [`DumpParser::new`].
pub fn open_dump(path: &Path, options: ParseOptions) -> TraceResult<DumpParser<DumpReader>> {
    let file = File::open(path)?;
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let reader: DumpReader = if gzipped {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    DumpParser::new(reader, options)
}

fn join(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::time::TimeUnit;

    const HEADER: &str = "\
$date today $end
$version Icarus Verilog $end
$timescale 1ns $end
$scope module test $end
$var reg 1 ! clk $end
$scope module dut $end
$var wire 4 \" count [3:0] $end
$upscope $end
$upscope $end
$enddefinitions $end
";

    fn parse(src: &str) -> TraceResult<(TraceHeader, Vec<DumpEvent>)> {
        parse_with(src, ParseOptions::default())
    }

    fn parse_with(src: &str, options: ParseOptions) -> TraceResult<(TraceHeader, Vec<DumpEvent>)> {
        let parser = DumpParser::new(src.as_bytes(), options)?;
        let header = parser.header().clone();
        let events = parser.collect::<TraceResult<Vec<_>>>()?;
        Ok((header, events))
    }

    fn changes(events: &[DumpEvent]) -> Vec<(u64, String)> {
        events
            .iter()
            .filter_map(|e| match e {
                DumpEvent::Change(c) => Some((c.time, c.value.to_string())),
                DumpEvent::Time { .. } => None,
            })
            .collect()
    }

    #[test]
    fn header_declarations() {
        let (header, events) = parse(HEADER).unwrap();
        assert!(events.is_empty());
        assert_eq!(header.timescale.unit, TimeUnit::Ns);
        assert_eq!(header.date.as_deref(), Some("today"));
        assert_eq!(header.version.as_deref(), Some("Icarus Verilog"));
        assert_eq!(header.signals.len(), 2);
        let count = &header.signals[1];
        assert_eq!(count.full_name(), "test.dut.count");
        assert_eq!(count.width, 4);
        assert_eq!(count.range.as_deref(), Some("[3:0]"));
        assert_eq!(count.var_type, "wire");
        assert_eq!(header.scopes.len(), 2);
        assert_eq!(header.scopes[1].path, vec!["test", "dut"]);
    }

    #[test]
    fn multiline_declarations() {
        let src = "$timescale\n  10 ps\n$end\n$var wire\n 1 ! a\n $end\n$enddefinitions\n$end\n";
        let (header, _) = parse(src).unwrap();
        assert_eq!(header.timescale.fs_per_tick(), 10_000);
        assert_eq!(header.signals[0].name, "a");
    }

    #[test]
    fn default_timescale_is_fs() {
        let (header, _) = parse("$var wire 1 ! a $end $enddefinitions $end").unwrap();
        assert_eq!(header.timescale, Timescale::default());
    }

    #[test]
    fn body_events() {
        let src = format!("{HEADER}#0\n$dumpvars\n0!\nb0000 \"\n$end\n#10\n1!\nb1 \"\n");
        let err = parse(&src).unwrap_err();
        // b1 is too short for a 4-bit signal
        assert_eq!(err.kind(), ErrorKind::MalformedTrace);
        assert_eq!(err.line(), Some(18));

        let src = format!("{HEADER}#0\n$dumpvars\n0!\nb0000 \"\n$end\n#10\n1!\nB0001 \"\n");
        let (_, events) = parse(&src).unwrap();
        assert_eq!(
            changes(&events),
            vec![
                (0, "0".to_string()),
                (0, "0000".to_string()),
                (10, "1".to_string()),
                (10, "0001".to_string()),
            ]
        );
        assert_eq!(events[0], DumpEvent::Time { time: 0, line: 11 });
    }

    #[test]
    fn changes_before_first_marker_are_at_zero() {
        let src = format!("{HEADER}1!\n#5\n");
        let (_, events) = parse(&src).unwrap();
        assert_eq!(changes(&events), vec![(0, "1".to_string())]);
    }

    #[test]
    fn lowercase_and_uppercase_symbols() {
        let src = format!("{HEADER}#0\nbxXzZ \"\nx!\n#1\nZ!\n");
        let (_, events) = parse(&src).unwrap();
        assert_eq!(
            changes(&events),
            vec![
                (0, "XXZZ".to_string()),
                (0, "X".to_string()),
                (1, "Z".to_string()),
            ]
        );
    }

    #[test]
    fn short_vector_rejected_by_default() {
        let src = format!("{HEADER}#0\nb010 \"\n");
        let err = parse(&src).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTrace);
        assert_eq!(err.line(), Some(12));
    }

    #[test]
    fn short_vector_extended_when_enabled() {
        let opts = ParseOptions {
            extend_short_vectors: true,
        };
        let src = format!("{HEADER}#0\nb10 \"\nbz \"\n");
        let (_, events) = parse_with(&src, opts).unwrap();
        assert_eq!(
            changes(&events),
            vec![(0, "0010".to_string()), (0, "ZZZZ".to_string())]
        );
    }

    #[test]
    fn long_vector_always_rejected() {
        let opts = ParseOptions {
            extend_short_vectors: true,
        };
        let src = format!("{HEADER}#0\nb10101 \"\n");
        assert_eq!(
            parse_with(&src, opts).unwrap_err().kind(),
            ErrorKind::MalformedTrace
        );
    }

    #[test]
    fn undeclared_code() {
        let src = format!("{HEADER}#0\n1%\n");
        let err = parse(&src).unwrap_err();
        assert!(err.to_string().contains("undeclared identifier code '%'"));
        assert_eq!(err.line(), Some(12));
    }

    #[test]
    fn scalar_on_vector_is_width_mismatch() {
        let src = format!("{HEADER}#0\n1\"\n");
        assert_eq!(parse(&src).unwrap_err().kind(), ErrorKind::MalformedTrace);
    }

    #[test]
    fn out_of_order_time() {
        let src = format!("{HEADER}#10\n#5\n");
        match parse(&src).unwrap_err() {
            TraceError::OutOfOrderTime {
                line,
                previous,
                found,
            } => {
                assert_eq!((line, previous, found), (12, 10, 5));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_timestamp_is_allowed() {
        let src = format!("{HEADER}#10\n#10\n1!\n");
        assert!(parse(&src).is_ok());
    }

    #[test]
    fn empty_stream() {
        assert_eq!(
            parse("").unwrap_err().kind(),
            ErrorKind::UnexpectedEndOfStream
        );
    }

    #[test]
    fn truncated_declaration() {
        let err = parse("$var wire 1 ! a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEndOfStream);
        assert!(err.to_string().contains("$end closing $var"));
    }

    #[test]
    fn truncated_vector_code() {
        let src = format!("{HEADER}#0\nb0101");
        assert_eq!(
            parse(&src).unwrap_err().kind(),
            ErrorKind::UnexpectedEndOfStream
        );
    }

    #[test]
    fn unterminated_dumpvars() {
        let src = format!("{HEADER}#0\n$dumpvars\n0!\n");
        assert_eq!(
            parse(&src).unwrap_err().kind(),
            ErrorKind::UnexpectedEndOfStream
        );
    }

    #[test]
    fn stray_end_in_body() {
        let src = format!("{HEADER}#0\n$end\n");
        assert_eq!(parse(&src).unwrap_err().kind(), ErrorKind::MalformedTrace);
    }

    #[test]
    fn body_comment_skipped() {
        let src = format!("{HEADER}#0\n$comment hello\nworld $end\n1!\n");
        let (_, events) = parse(&src).unwrap();
        assert_eq!(changes(&events).len(), 1);
    }

    #[test]
    fn unknown_declaration_skipped() {
        let src = "$attrbegin misc 07 foo $end\n$var wire 1 ! a $end\n$enddefinitions $end\n";
        let (header, _) = parse(src).unwrap();
        assert_eq!(header.signals.len(), 1);
    }

    #[test]
    fn upscope_without_scope() {
        let err = parse("$upscope $end $enddefinitions $end").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTrace);
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn scope_left_open() {
        let err = parse("$scope module top $end\n$enddefinitions $end\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTrace);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn bad_var_width() {
        let err = parse("$var wire 0 ! a $end $enddefinitions $end").unwrap_err();
        assert!(err.to_string().contains("invalid width"));
    }

    #[test]
    fn alias_width_conflict() {
        let src = "$var wire 4 ! a $end\n$var wire 1 ! b $end\n$enddefinitions $end\n";
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTrace);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn real_change_rejected() {
        let src = format!("{HEADER}#0\nr1.5 !\n");
        assert!(parse(&src)
            .unwrap_err()
            .to_string()
            .contains("not supported"));
    }

    #[test]
    fn iterator_fuses_after_error() {
        let src = format!("{HEADER}#10\n#5\n#20\n");
        let mut parser = DumpParser::new(src.as_bytes(), ParseOptions::default()).unwrap();
        assert!(matches!(parser.next(), Some(Ok(DumpEvent::Time { time: 10, .. }))));
        assert!(matches!(parser.next(), Some(Err(_))));
        assert!(parser.next().is_none());
    }

    #[test]
    fn content_hash_after_drain() {
        let src = format!("{HEADER}#0\n1!\n");
        let mut parser = DumpParser::new(src.as_bytes(), ParseOptions::default()).unwrap();
        for event in &mut parser {
            event.unwrap();
        }
        assert_eq!(parser.content_hash(), ContentHash::of(src.as_bytes()));
    }

    #[test]
    fn open_gzip_dump() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.vcd.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(format!("{HEADER}#0\n1!\n").as_bytes()).unwrap();
        enc.finish().unwrap();

        let parser = open_dump(&path, ParseOptions::default()).unwrap();
        assert_eq!(parser.header().signals.len(), 2);
        assert_eq!(parser.count(), 2);
    }

    #[test]
    fn open_missing_file() {
        let err = open_dump(Path::new("/nonexistent/run.vcd"), ParseOptions::default()).err();
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::Io));
    }
}
