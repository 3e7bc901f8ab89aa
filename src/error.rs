//! Error types for respipe
//!
//! Two layers: `ParseError` is local to the reply decoder, `RespipeError` is
//! what the pipeline and its callers see.

use thiserror::Error;

/// Result type alias using RespipeError
pub type Result<T> = std::result::Result<T, RespipeError>;

/// Unified error type for respipe operations
#[derive(Debug, Error)]
pub enum RespipeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Failure before a connection exists (address resolution, connect)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Lets `?` lift decoder errors for callers driving a `Decoder` directly.
    /// The pipeline reports them as `Disconnected` instead.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The server replied with an `-ERR ...` line
    #[error("Error response: {0}")]
    ErrorResponse(String),

    /// Rejected before anything was written, e.g. a command with no name
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// Permanent: the pipeline never touches the socket again after this
    #[error("Disconnected from server: {0}")]
    Disconnected(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RespipeError {
    /// Returns true if the pipeline that produced this error is unusable.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, RespipeError::Disconnected(_))
    }
}

/// Decoder errors. All of them are fatal to the decoder instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected reply type byte: {0:#04x}")]
    UnexpectedReplyType(u8),

    #[error("invalid int response: {0:?}")]
    InvalidInteger(String),

    #[error("invalid bulk length: {0:?}")]
    InvalidBulkLength(String),

    #[error("invalid multi bulk count: {0:?}")]
    InvalidArrayCount(String),

    #[error("invalid bulk terminator byte: {0:#04x}")]
    InvalidBulkTerminator(u8),

    /// More arrays open at once than the decoder's `max_depth` allows
    #[error("nesting too deep: more than {0} open arrays")]
    NestingTooDeep(usize),

    /// Input was fed after an earlier fatal error
    #[error("decoder is poisoned by an earlier error")]
    Poisoned,
}
