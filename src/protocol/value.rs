//! Reply values
//!
//! Represents fully decoded server replies.

use std::fmt;

use bytes::Bytes;

use crate::error::{RespipeError, Result};

/// A decoded reply
///
/// `Nil` stands for both the null bulk string (`$-1`) and the null array
/// (`*-1`). It never collapses into an empty string or an empty array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyValue {
    /// `+OK`
    SimpleString(String),

    /// `-ERR message`, kept verbatim
    Error(String),

    /// `:42`
    Integer(i64),

    /// `$5\r\nhello`, binary safe
    BulkString(Bytes),

    /// `*2\r\n...`
    Array(Vec<ReplyValue>),

    /// `$-1` or `*-1`
    Nil,
}

impl ReplyValue {
    /// Bulk string from anything byte-like
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        ReplyValue::BulkString(data.into())
    }

    pub fn simple(text: impl Into<String>) -> Self {
        ReplyValue::SimpleString(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        ReplyValue::Error(text.into())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, ReplyValue::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReplyValue::Error(_))
    }

    /// True for the `+OK` status reply
    pub fn is_ok(&self) -> bool {
        matches!(self, ReplyValue::SimpleString(text) if text == "OK")
    }

    /// Payload of a simple or bulk string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ReplyValue::SimpleString(text) => Some(text.as_bytes()),
            ReplyValue::BulkString(data) => Some(&data[..]),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ReplyValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ReplyValue]> {
        match self {
            ReplyValue::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Turn an error reply into `RespipeError::ErrorResponse`.
    ///
    /// The protocol has no notion of an "expected" error, so this is left to
    /// callers that want `?` semantics for server errors.
    pub fn into_result(self) -> Result<ReplyValue> {
        match self {
            ReplyValue::Error(message) => Err(RespipeError::ErrorResponse(message)),
            other => Ok(other),
        }
    }

    /// Encode this value as a server would send it
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            ReplyValue::SimpleString(text) => push_line(out, b'+', text.as_bytes()),
            ReplyValue::Error(text) => push_line(out, b'-', text.as_bytes()),
            ReplyValue::Integer(value) => push_line(out, b':', value.to_string().as_bytes()),
            ReplyValue::BulkString(data) => {
                push_line(out, b'$', data.len().to_string().as_bytes());
                out.extend_from_slice(data);
                out.extend_from_slice(b"\r\n");
            }
            ReplyValue::Array(items) => {
                push_line(out, b'*', items.len().to_string().as_bytes());
                for item in items {
                    item.encode(out);
                }
            }
            ReplyValue::Nil => out.extend_from_slice(b"$-1\r\n"),
        }
    }

    /// Convenience wrapper over `encode`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            ReplyValue::SimpleString(text) => write!(f, "{}", text),
            ReplyValue::Error(text) => write!(f, "(error) {}", text),
            ReplyValue::Integer(value) => write!(f, "(integer) {}", value),
            ReplyValue::BulkString(data) => write!(f, "\"{}\"", data.escape_ascii()),
            ReplyValue::Nil => write!(f, "(nil)"),
            ReplyValue::Array(items) if items.is_empty() => write!(f, "(empty array)"),
            ReplyValue::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "\n{:indent$}", "", indent = indent)?;
                    }
                    let prefix = format!("{}) ", idx + 1);
                    f.write_str(&prefix)?;
                    item.fmt_indented(f, indent + prefix.len())?;
                }
                Ok(())
            }
        }
    }
}

/// redis-cli style rendering
impl fmt::Display for ReplyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

fn push_line(out: &mut Vec<u8>, prefix: u8, body: &[u8]) {
    out.push(prefix);
    out.extend_from_slice(body);
    out.extend_from_slice(b"\r\n");
}
