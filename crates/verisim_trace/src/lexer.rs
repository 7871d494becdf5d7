//! Whitespace tokenizer over a dump stream.
//!
//! Reads one line at a time, so memory stays bounded by the longest line,
//! and feeds every byte it reads into a content hasher.

use std::collections::VecDeque;
use std::io::BufRead;

use verisim_common::{ContentHash, ContentHasher};

use crate::error::{TraceError, TraceResult};

/// A whitespace-delimited token and the 1-based line it appeared on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub text: String,
    pub line: usize,
}

pub(crate) struct Lexer<R> {
    reader: R,
    buf: Vec<u8>,
    pending: VecDeque<String>,
    line: usize,
    hasher: ContentHasher,
    exhausted: bool,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pending: VecDeque::new(),
            line: 0,
            hasher: ContentHasher::new(),
            exhausted: false,
        }
    }

    /// Returns the next token, or `None` once the stream is drained.
    ///
    /// Fails with `MalformedTrace` on a line that is not valid UTF-8.
    pub fn next_token(&mut self) -> TraceResult<Option<Token>> {
        loop {
            if let Some(text) = self.pending.pop_front() {
                return Ok(Some(Token {
                    text,
                    line: self.line,
                }));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                self.exhausted = true;
                return Ok(None);
            }
            self.hasher.update(&self.buf);
            self.line += 1;
            let text = std::str::from_utf8(&self.buf).map_err(|e| {
                TraceError::malformed(
                    self.line,
                    format!("invalid UTF-8 at byte {} of the line", e.valid_up_to()),
                )
            })?;
            self.pending
                .extend(text.split_ascii_whitespace().map(str::to_owned));
        }
    }

    /// The number of lines read so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Hash of every byte read so far.
    pub fn content_hash(&self) -> ContentHash {
        self.hasher.finish()
    }
}
