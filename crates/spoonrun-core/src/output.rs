//! Streaming capture of tool console output.
//!
//! Every raw line is echoed once to an optional pass-through callback, then
//! normalized (trimmed, trailing progress glyph removed) and stored unless it
//! repeats the previously stored line or the byte budget is exhausted.
//! Stored lines can then be queried with single-group [`ExtractionPattern`]s.

use std::fmt;
use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Default number of normalized bytes retained per invocation (1MB).
pub const DEFAULT_OUTPUT_BUDGET: usize = 1_000_000;

/// Animated progress glyphs the tool appends to otherwise-stable lines.
const MARQUEE_GLYPHS: [char; 4] = ['\\', '|', '/', '-'];

/// Output callback type for echoing raw lines
pub type OutputCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives raw output lines from a running process.
pub trait OutputSink: Send {
    /// Accept one raw line, including its trailing `\n` when it had one.
    fn accept_line(&mut self, raw: &[u8]);
}

/// Resolve a WHATWG encoding label usable for line-oriented decoding.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| CoreError::config(format!("unknown text encoding '{label}'")))?;
    if !encoding.is_ascii_compatible() {
        return Err(CoreError::config(format!(
            "text encoding '{}' is not ASCII-compatible and cannot be split into lines",
            encoding.name()
        )));
    }
    Ok(encoding)
}

/// A regular expression with exactly one capturing group.
#[derive(Debug, Clone)]
pub struct ExtractionPattern {
    regex: Regex,
}

impl ExtractionPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            CoreError::config(format!("invalid extraction pattern `{pattern}`: {e}"))
        })?;

        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(CoreError::config(format!(
                "extraction pattern `{pattern}` must have exactly one capturing group, found {groups}"
            )));
        }

        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// First capturing group of the leftmost match in `text`.
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|group| group.as_str())
    }
}

impl fmt::Display for ExtractionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.regex.as_str())
    }
}

/// A normalized line and its position in the raw stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    pub index: usize,
    pub text: String,
}

/// Lines retained from one process invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedOutput {
    lines: Vec<OutputLine>,
    total_bytes: usize,
    truncated: bool,
}

impl CapturedOutput {
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Bytes of normalized text retained.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Whether storage stopped because the byte budget ran out.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// First capture of every matching line, in storage order.
    pub fn find_all(&self, pattern: &ExtractionPattern) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| pattern.extract(&line.text))
            .collect()
    }

    pub fn find_last(&self, pattern: &ExtractionPattern) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .find_map(|line| pattern.extract(&line.text))
    }

    /// Retained lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Trim a line and strip a single trailing progress glyph.
pub fn normalize_line(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(MARQUEE_GLYPHS) {
        Some(rest) => rest.trim_end(),
        None => trimmed,
    }
}

/// Streaming sink that echoes, normalizes, deduplicates and bounds output.
pub struct OutputCollector {
    encoding: &'static Encoding,
    budget: usize,
    echo: Option<OutputCallback>,
    pending: Vec<u8>,
    lines: Vec<OutputLine>,
    stored_bytes: usize,
    saturated: bool,
    seen: usize,
}

impl OutputCollector {
    /// Create a UTF-8 collector retaining at most `budget` bytes.
    pub fn new(budget: usize) -> Self {
        Self {
            encoding: UTF_8,
            budget,
            echo: None,
            pending: Vec::new(),
            lines: Vec::new(),
            stored_bytes: 0,
            saturated: false,
            seen: 0,
        }
    }

    /// Collector that only echoes and stores nothing.
    pub fn echo_only() -> Self {
        Self::new(0)
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_echo(mut self, echo: OutputCallback) -> Self {
        self.echo = Some(echo);
        self
    }

    pub fn with_echo_opt(mut self, echo: Option<OutputCallback>) -> Self {
        self.echo = echo;
        self
    }

    /// Feed an arbitrary chunk of bytes; complete lines are processed now,
    /// the unterminated tail waits for more input or [`finish`](Self::finish).
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.process_line(&line);
        }
    }

    /// Flush any unterminated tail and return what was retained.
    pub fn finish(mut self) -> CapturedOutput {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.process_line(&tail);
        }

        CapturedOutput {
            lines: self.lines,
            total_bytes: self.stored_bytes,
            truncated: self.saturated,
        }
    }

    fn process_line(&mut self, raw: &[u8]) {
        let index = self.seen;
        self.seen += 1;

        let (decoded, had_errors) = self.encoding.decode_without_bom_handling(raw);
        if had_errors {
            debug!(
                index,
                encoding = self.encoding.name(),
                "Replaced undecodable bytes in output line"
            );
        }

        if let Some(echo) = &self.echo {
            echo(decoded.as_ref());
        }

        let normalized = normalize_line(&decoded);
        if normalized.is_empty() {
            return;
        }

        if self
            .lines
            .last()
            .is_some_and(|previous| previous.text == normalized)
        {
            return;
        }

        if self.saturated {
            return;
        }

        if self.stored_bytes + normalized.len() > self.budget {
            self.saturated = true;
            debug!(
                index,
                budget = self.budget,
                stored_bytes = self.stored_bytes,
                "Output budget exhausted, no further lines retained"
            );
            return;
        }

        self.stored_bytes += normalized.len();
        self.lines.push(OutputLine {
            index,
            text: normalized.to_string(),
        });
    }
}

impl OutputSink for OutputCollector {
    fn accept_line(&mut self, raw: &[u8]) {
        self.process_line(raw);
    }
}

impl fmt::Debug for OutputCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputCollector")
            .field("encoding", &self.encoding.name())
            .field("budget", &self.budget)
            .field("stored_lines", &self.lines.len())
            .field("stored_bytes", &self.stored_bytes)
            .field("saturated", &self.saturated)
            .finish()
    }
}
