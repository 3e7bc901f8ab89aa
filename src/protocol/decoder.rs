//! Incremental reply decoder
//!
//! A resumable state machine that turns arbitrarily fragmented socket bytes
//! into a FIFO queue of complete replies. It owns no socket and never blocks.
//!
//! ## State Machine
//! ```text
//!                      + - :               \n
//!  AwaitingReplyType ───────► ReadingLine ─────────────────────► finalize
//!        │
//!        │ $                      n > 0               n bytes
//!        ├──► ReadingBulkLength ───────► ReadingBulkBody ───────► ReadingBulkTerminator
//!        │         │  n == 0                                          ▲        │ \n
//!        │         ├──────────────────────────────────────────────────┘        ▼
//!        │         └─ n < 0 ──► finalize(Nil)                               finalize
//!        │ *
//!        └──► ReadingArrayCount ── count > 0 ──► push frame ──► AwaitingReplyType
//!                  ├─ count == 0 ──► finalize([])
//!                  └─ count < 0  ──► finalize(Nil)
//! ```
//!
//! Nested arrays are tracked with an explicit stack of frames rather than
//! recursion, so decoding can stop and resume at any byte. Nesting is capped
//! by `max_depth` (default [`DEFAULT_MAX_DEPTH`]): a decoded `ReplyValue` is
//! still dropped recursively, and an unbounded reply could overflow the stack
//! of whoever drops it.

use std::collections::VecDeque;
use std::fmt;

use bytes::BytesMut;

use crate::error::ParseError;
use super::ReplyValue;

/// Upper bound on up-front allocation driven by a length header
const MAX_PREALLOC_BYTES: usize = 64 * 1024;
const MAX_PREALLOC_ITEMS: usize = 1024;

/// Default cap on simultaneously open arrays.
///
/// Real replies rarely nest more than a few levels; this leaves ample room
/// while keeping the recursive drop of a decoded value shallow.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Invoked once per completed top-level reply
pub type CompletionHook = Box<dyn FnMut() + Send>;

/// Kinds of reply carried on a single `\r\n` terminated line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    SimpleString,
    Error,
    Integer,
}

/// Resumable parser position
#[derive(Debug)]
enum DecoderState {
    AwaitingReplyType,
    ReadingLine { kind: LineKind, text: Vec<u8> },
    ReadingBulkLength { text: Vec<u8> },
    ReadingBulkBody { remaining: usize, body: BytesMut },
    ReadingBulkTerminator { body: BytesMut },
    ReadingArrayCount { text: Vec<u8> },
}

/// One open, not yet complete array reply
#[derive(Debug)]
struct AggregateFrame {
    /// Elements still expected
    remaining: usize,
    collected: Vec<ReplyValue>,
}

/// Incremental RESP reply decoder
///
/// Replies come out of [`Decoder::take_next`] in exactly the order they were
/// completed on the wire.
pub struct Decoder {
    state: DecoderState,

    /// Open arrays, innermost last
    frames: Vec<AggregateFrame>,

    completed: VecDeque<ReplyValue>,

    on_complete: Option<CompletionHook>,

    /// Max open arrays before input is rejected
    max_depth: usize,

    poisoned: bool,
}

impl Decoder {
    /// Create an idle decoder with no completion hook
    pub fn new() -> Self {
        Self {
            state: DecoderState::AwaitingReplyType,
            frames: Vec::new(),
            completed: VecDeque::new(),
            on_complete: None,
            max_depth: DEFAULT_MAX_DEPTH,
            poisoned: false,
        }
    }

    /// Create a decoder that rejects replies nesting more than `max_depth`
    /// arrays with [`ParseError::NestingTooDeep`]
    pub fn with_max_depth(max_depth: usize) -> Self {
        let mut decoder = Self::new();
        decoder.set_max_depth(max_depth);
        decoder
    }

    /// Create a decoder that calls `hook` once per completed top-level reply.
    ///
    /// The hook never fires for elements of a still-open array. Any token the
    /// caller needs is captured by the closure.
    pub fn with_completion_hook(hook: impl FnMut() + Send + 'static) -> Self {
        let mut decoder = Self::new();
        decoder.set_completion_hook(hook);
        decoder
    }

    pub fn set_completion_hook(&mut self, hook: impl FnMut() + Send + 'static) {
        self.on_complete = Some(Box::new(hook));
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Consume a chunk of bytes, completing as many replies as it contains.
    ///
    /// Chunk boundaries are irrelevant: feeding a reply one byte at a time
    /// yields the same values as feeding it in one piece. After an error the
    /// decoder is poisoned and rejects further input with
    /// [`ParseError::Poisoned`].
    pub fn feed(&mut self, data: &[u8]) -> Result<(), ParseError> {
        if self.poisoned {
            return Err(ParseError::Poisoned);
        }

        let mut pos = 0;
        while pos < data.len() {
            match self.step(&data[pos..]) {
                Ok(consumed) => pos += consumed,
                Err(err) => {
                    self.poisoned = true;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Pop the oldest completed reply
    pub fn take_next(&mut self) -> Option<ReplyValue> {
        self.completed.pop_front()
    }

    /// Remove every completed reply, oldest first
    pub fn drain_completed(&mut self) -> Vec<ReplyValue> {
        self.completed.drain(..).collect()
    }

    /// Number of completed replies waiting to be taken
    pub fn queued(&self) -> usize {
        self.completed.len()
    }

    /// Number of currently open (incomplete) arrays
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when the decoder sits exactly between two top-level replies
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::AwaitingReplyType) && self.frames.is_empty()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Advance the state machine on non-empty `input`, returning bytes consumed
    fn step(&mut self, input: &[u8]) -> Result<usize, ParseError> {
        match &mut self.state {
            DecoderState::AwaitingReplyType => {
                self.state = match input[0] {
                    b'+' => DecoderState::line(LineKind::SimpleString),
                    b'-' => DecoderState::line(LineKind::Error),
                    b':' => DecoderState::line(LineKind::Integer),
                    b'$' => DecoderState::ReadingBulkLength { text: Vec::new() },
                    b'*' => DecoderState::ReadingArrayCount { text: Vec::new() },
                    other => return Err(ParseError::UnexpectedReplyType(other)),
                };
                Ok(1)
            }
            DecoderState::ReadingLine { kind, text } => {
                let kind = *kind;
                let (consumed, complete) = scan_line(text, input);
                if complete {
                    let line = std::mem::take(text);
                    self.finish_line(kind, &line)?;
                }
                Ok(consumed)
            }
            DecoderState::ReadingBulkLength { text } => {
                let (consumed, complete) = scan_line(text, input);
                if complete {
                    let line = std::mem::take(text);
                    self.finish_bulk_length(&line)?;
                }
                Ok(consumed)
            }
            DecoderState::ReadingArrayCount { text } => {
                let (consumed, complete) = scan_line(text, input);
                if complete {
                    let line = std::mem::take(text);
                    self.finish_array_count(&line)?;
                }
                Ok(consumed)
            }
            DecoderState::ReadingBulkBody { remaining, body } => {
                // Body bytes are opaque: no \r or \n handling here
                let n = (*remaining).min(input.len());
                body.extend_from_slice(&input[..n]);
                *remaining -= n;
                if *remaining == 0 {
                    let body = std::mem::take(body);
                    self.state = DecoderState::ReadingBulkTerminator { body };
                }
                Ok(n)
            }
            DecoderState::ReadingBulkTerminator { body } => match input[0] {
                b'\r' => Ok(1),
                b'\n' => {
                    let body = std::mem::take(body).freeze();
                    self.finalize(ReplyValue::BulkString(body));
                    Ok(1)
                }
                other => Err(ParseError::InvalidBulkTerminator(other)),
            },
        }
    }

    fn finish_line(&mut self, kind: LineKind, line: &[u8]) -> Result<(), ParseError> {
        let value = match kind {
            LineKind::SimpleString => ReplyValue::SimpleString(lossy(line)),
            LineKind::Error => ReplyValue::Error(lossy(line)),
            LineKind::Integer => {
                let value = parse_int(line).ok_or_else(|| ParseError::InvalidInteger(lossy(line)))?;
                ReplyValue::Integer(value)
            }
        };
        self.finalize(value);
        Ok(())
    }

    fn finish_bulk_length(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let len = parse_int(line).ok_or_else(|| ParseError::InvalidBulkLength(lossy(line)))?;
        if len < 0 {
            self.finalize(ReplyValue::Nil);
            return Ok(());
        }

        let remaining =
            usize::try_from(len).map_err(|_| ParseError::InvalidBulkLength(lossy(line)))?;
        self.state = if remaining == 0 {
            DecoderState::ReadingBulkTerminator { body: BytesMut::new() }
        } else {
            DecoderState::ReadingBulkBody {
                remaining,
                body: BytesMut::with_capacity(remaining.min(MAX_PREALLOC_BYTES)),
            }
        };
        Ok(())
    }

    fn finish_array_count(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let count = parse_int(line).ok_or_else(|| ParseError::InvalidArrayCount(lossy(line)))?;
        if count < 0 {
            self.finalize(ReplyValue::Nil);
            return Ok(());
        }
        if count == 0 {
            self.finalize(ReplyValue::Array(Vec::new()));
            return Ok(());
        }

        let remaining =
            usize::try_from(count).map_err(|_| ParseError::InvalidArrayCount(lossy(line)))?;
        if self.frames.len() >= self.max_depth {
            return Err(ParseError::NestingTooDeep(self.max_depth));
        }
        self.frames.push(AggregateFrame {
            remaining,
            collected: Vec::with_capacity(remaining.min(MAX_PREALLOC_ITEMS)),
        });
        self.state = DecoderState::AwaitingReplyType;
        Ok(())
    }

    /// Deliver a completed value to the innermost open array, or to the queue.
    ///
    /// Closing an array can close its parent too, so this loops until it hits
    /// an array that still expects elements or reaches the top level.
    fn finalize(&mut self, value: ReplyValue) {
        self.state = DecoderState::AwaitingReplyType;

        let mut value = value;
        loop {
            let Some(frame) = self.frames.last_mut() else {
                self.completed.push_back(value);
                if let Some(hook) = self.on_complete.as_mut() {
                    hook();
                }
                return;
            };

            frame.collected.push(value);
            frame.remaining -= 1;
            if frame.remaining > 0 {
                return;
            }

            match self.frames.pop() {
                Some(done) => value = ReplyValue::Array(done.collected),
                None => return,
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("state", &self.state)
            .field("depth", &self.frames.len())
            .field("queued", &self.completed.len())
            .field("has_hook", &self.on_complete.is_some())
            .field("max_depth", &self.max_depth)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

impl DecoderState {
    fn line(kind: LineKind) -> Self {
        DecoderState::ReadingLine { kind, text: Vec::new() }
    }
}

/// Append line bytes up to the next `\n`, dropping every `\r`.
///
/// Returns the number of bytes consumed and whether the line ended.
fn scan_line(text: &mut Vec<u8>, input: &[u8]) -> (usize, bool) {
    let (chunk, consumed, complete) = match input.iter().position(|&b| b == b'\n') {
        Some(idx) => (&input[..idx], idx + 1, true),
        None => (input, input.len(), false),
    };
    text.extend(chunk.iter().copied().filter(|&b| b != b'\r'));
    (consumed, complete)
}

fn parse_int(line: &[u8]) -> Option<i64> {
    std::str::from_utf8(line).ok()?.parse().ok()
}

fn lossy(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}
