//! Protocol Module
//!
//! Defines the RESP wire protocol spoken with the server.
//!
//! ## Protocol Format
//!
//! ### Request Format
//! ```text
//! ┌────────────┬───────────────────────────────────────────┐
//! │ *<N>\r\n   │  N x ( $<len>\r\n <bytes> \r\n )          │
//! └────────────┴───────────────────────────────────────────┘
//! ```
//!
//! ### Reply Types
//! - `+`: simple string
//! - `-`: error
//! - `:`: integer
//! - `$`: bulk string (`$-1` = nil)
//! - `*`: array (`*-1` = nil), elements may themselves be arrays

mod codec;
mod command;
mod decoder;
mod value;

pub use codec::{encode_command, encode_command_to_vec};
pub use command::{Command, ToArg};
pub use decoder::{CompletionHook, Decoder, DEFAULT_MAX_DEPTH};
pub use value::ReplyValue;
