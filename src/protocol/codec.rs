//! Protocol codec
//!
//! Request serialization. Replies go the other way through [`super::Decoder`].
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! *<N>\r\n
//! $<len>\r\n<arg bytes>\r\n      (repeated N times)
//! ```
//!
//! ### Reply Format (first byte selects the type)
//! ```text
//! +line\r\n                 simple string
//! -line\r\n                 error
//! :digits\r\n               integer
//! $len\r\n<len bytes>\r\n   bulk string ($-1 is nil)
//! *count\r\n<count replies> array (*-1 is nil)
//! ```

use super::Command;

/// Encode a command into `out` (appending)
///
/// Format: `*<argc>\r\n` then `$<len>\r\n<bytes>\r\n` per argument
pub fn encode_command(command: &Command, out: &mut Vec<u8>) {
    let args = command.args();
    let payload: usize = args.iter().map(|arg| arg.len() + 16).sum();
    out.reserve(16 + payload);

    out.push(b'*');
    push_usize(out, args.len());
    out.extend_from_slice(b"\r\n");
    for arg in args {
        out.push(b'$');
        push_usize(out, arg.len());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
}

/// Encode a command into a fresh buffer
pub fn encode_command_to_vec(command: &Command) -> Vec<u8> {
    let mut out = Vec::new();
    encode_command(command, &mut out);
    out
}

fn push_usize(out: &mut Vec<u8>, mut value: usize) {
    // Digits go into a stack buffer first, least significant first
    let mut buf = [0u8; 20];
    let mut len = 0;
    loop {
        buf[len] = b'0' + (value % 10) as u8;
        value /= 10;
        len += 1;
        if value == 0 {
            break;
        }
    }
    out.extend(buf[..len].iter().rev());
}
