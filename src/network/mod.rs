//! Network Module
//!
//! Client-side connection handling.
//!
//! ## Architecture
//! - `Transport`: raw byte pipe (TCP in production)
//! - `Pipeline`: owns one transport and one decoder, enforces the in-flight limit
//! - Command helpers: thin `submit` wrappers on `Pipeline`

mod commands;
mod pipeline;
mod transport;

pub use pipeline::Pipeline;
pub use transport::{TcpTransport, Transport};
