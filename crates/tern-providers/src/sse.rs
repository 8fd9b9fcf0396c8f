//! Incremental SSE frame decoding
//!
//! Upstream bodies arrive as arbitrary byte chunks; frame boundaries (a
//! blank line) rarely align with read boundaries, and a multi-byte UTF-8
//! sequence can straddle two reads. The parser buffers raw bytes between
//! pushes and only decodes text at whole-frame granularity, so a stream
//! split at any byte offset yields the same events as a single-chunk feed.

/// One decoded SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, when present.
    pub event: Option<String>,
    /// All `data:` lines of the frame, joined by newlines.
    pub data: String,
}

/// Stateful frame splitter. Feed chunks with [`SseParser::push`]; call
/// [`SseParser::finish`] once the stream ends to flush an unterminated tail.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every event the chunk completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((start, sep_len)) = find_boundary(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..start + sep_len).collect();
            if let Some(event) = parse_block(&block[..start]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing block left unterminated when the stream ended.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let tail = std::mem::take(&mut self.buffer);
        if String::from_utf8_lossy(&tail).trim().is_empty() {
            return None;
        }
        parse_block(&tail)
    }
}

/// Find the first blank-line boundary, matching `\r?\n\r?\n`. Returns the
/// byte offset where the separator starts and the separator's length.
fn find_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i < buffer.len() {
        let mut j = i;
        if buffer[j] == b'\r' {
            j += 1;
        }
        if j >= buffer.len() || buffer[j] != b'\n' {
            i += 1;
            continue;
        }
        j += 1;
        if j < buffer.len() && buffer[j] == b'\r' {
            j += 1;
        }
        if j < buffer.len() && buffer[j] == b'\n' {
            return Some((i, j + 1 - i));
        }
        i += 1;
    }
    None
}

/// Decode one raw block. `event:` sets the (trimmed) event name; `data:`
/// lines are collected with at most one following space stripped. Blocks
/// without data yield nothing.
fn parse_block(block: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(block);

    let mut event = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = Some(name.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    if data_lines.is_empty() {
        return None;
    }
    Some(SseEvent {
        event,
        data: data_lines.join("\n"),
    })
}
