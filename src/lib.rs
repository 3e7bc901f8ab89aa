//! # respipe
//!
//! A minimal pipelined client for RESP servers:
//! - Incremental reply decoder that resumes at any byte boundary
//! - Arbitrarily nested array replies without recursion
//! - Bounded pipelining with backpressure on submission
//! - Strict submission-order reply matching
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller                               │
//! │        submit / get_response / flush_pipeline               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Pipeline                               │
//! │      (pending counter, capacity, disconnect state)          │
//! └──────────┬─────────────────────────────────┬────────────────┘
//!            │ encoded commands                │ received bytes
//!            ▼                                 ▼
//!   ┌─────────────────┐               ┌─────────────────┐
//!   │    Transport    │──── bytes ───►│     Decoder     │
//!   │  (TcpStream)    │               │ (state machine) │
//!   └─────────────────┘               └────────┬────────┘
//!                                              │ completion hook
//!                                              ▼
//!                                       pending -= 1
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use respipe::{Pipeline, PipelineConfig};
//!
//! # fn main() -> respipe::Result<()> {
//! let config = PipelineConfig::builder()
//!     .addr("127.0.0.1:6379")
//!     .pipeline_capacity(64)
//!     .build();
//! let mut pipeline = Pipeline::connect(config)?;
//!
//! for i in 0..1000 {
//!     pipeline.set(format!("key:{}", i), i)?;
//! }
//! let replies = pipeline.flush_pipeline()?;
//! assert!(replies.iter().all(|r| r.is_ok()));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ParseError, RespipeError, Result};
pub use config::PipelineConfig;
pub use network::{Pipeline, TcpTransport, Transport};
pub use protocol::{Command, Decoder, ReplyValue, ToArg};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of respipe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
