//! Splits a watch response body into JSON records.
//!
//! The engine has shipped two framings for `/watch`:
//!
//! - records separated by the ASCII record separator `\x1E`;
//! - Server-Sent Events, one record per `data:` frame ended by a blank line.
//!
//! The framing is detected from the first non-blank bytes. Chunks may end
//! anywhere, including inside a multi-byte UTF-8 sequence, so bytes are
//! buffered until a full record is available, up to a fixed limit.

use crate::error::MastraError;

/// ASCII record separator.
pub const RECORD_SEPARATOR: u8 = 0x1E;

/// Most bytes held while waiting for a record delimiter.
pub const MAX_BUFFERED_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    RecordSeparator,
    ServerSentEvents,
}

/// Incremental record decoder.
#[derive(Debug)]
pub struct RecordDecoder {
    buf: Vec<u8>,
    framing: Option<Framing>,
    max_buffered: usize,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_BUFFERED_BYTES)
    }
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that fails once more than `max_buffered` bytes are pending.
    pub fn with_limit(max_buffered: usize) -> Self {
        Self {
            buf: Vec::new(),
            framing: None,
            max_buffered,
        }
    }

    /// Detected framing, once enough bytes have arrived.
    pub fn framing(&self) -> Option<Framing> {
        self.framing
    }

    /// Feed a chunk and return every record it completes.
    ///
    /// Fails with [`MastraError::Stream`] when the bytes still waiting for
    /// a delimiter exceed the limit.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, MastraError> {
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        if self.framing.is_none() {
            self.framing = detect(&self.buf);
        }

        let records = match self.framing {
            Some(Framing::RecordSeparator) => self.drain_records(),
            Some(Framing::ServerSentEvents) => self.drain_sse_frames(),
            None => Vec::new(),
        };

        if self.buf.len() > self.max_buffered {
            let pending = self.buf.len();
            self.buf.clear();
            return Err(MastraError::Stream(format!(
                "{pending} bytes buffered without a record delimiter (limit {})",
                self.max_buffered
            )));
        }
        Ok(records)
    }

    /// Flush whatever is left once the body ends.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        let record = match self.framing {
            Some(Framing::ServerSentEvents) => sse_data(&rest),
            _ => non_blank(&rest),
        };
        record.filter(|r| !is_done_marker(r))
    }

    fn drain_records(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == RECORD_SEPARATOR) {
            let record: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(text) = non_blank(&record[..record.len() - 1]) {
                out.push(text);
            }
        }
        out
    }

    fn drain_sse_frames(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(pos) = find_blank_line(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..pos + 2).collect();
            if let Some(data) = sse_data(&frame) {
                if !is_done_marker(&data) {
                    out.push(data);
                }
            }
        }
        out
    }
}

fn detect(buf: &[u8]) -> Option<Framing> {
    let start = buf.iter().position(|b| !b.is_ascii_whitespace() && *b != RECORD_SEPARATOR)?;
    let head = &buf[start..];

    const SSE_FIELDS: [&[u8]; 4] = [b"data:", b"event:", b"id:", b"retry:"];
    if head.first() == Some(&b':') || SSE_FIELDS.iter().any(|f| head.starts_with(f)) {
        return Some(Framing::ServerSentEvents);
    }
    // A field name may still be arriving ("dat").
    if SSE_FIELDS.iter().any(|f| f.starts_with(head)) {
        return None;
    }
    Some(Framing::RecordSeparator)
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Join the `data:` lines of one SSE frame. Comments and other fields are
/// ignored.
fn sse_data(frame: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(frame);
    let lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if lines.is_empty() {
        return None;
    }
    non_blank(lines.join("\n").as_bytes())
}

fn non_blank(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_done_marker(record: &str) -> bool {
    record == "[DONE]"
}
