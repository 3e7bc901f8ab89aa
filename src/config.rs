//! Configuration for respipe
//!
//! Centralized pipeline configuration with sensible defaults.

use std::time::Duration;

use crate::error::{RespipeError, Result};
use crate::protocol::DEFAULT_MAX_DEPTH;

/// Main configuration for a pipeline connection
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server address, e.g. "127.0.0.1:6379" or "localhost:6379"
    pub addr: String,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// How long a blocking drain may wait for the socket (milliseconds, 0 = forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Upper bound on a single socket read
    pub read_chunk_size: usize,

    // -------------------------------------------------------------------------
    // Pipeline Configuration
    // -------------------------------------------------------------------------
    /// Max commands in flight before `submit` blocks
    pub pipeline_capacity: usize,

    /// Max array nesting accepted in a reply; deeper replies disconnect
    pub max_depth: usize,

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------
    /// ACL user name, sent as `AUTH <username> <password>` when set
    pub username: Option<String>,

    /// Sent with AUTH right after connecting
    pub password: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            connect_timeout_ms: 0,
            read_timeout_ms: 60_000,
            write_timeout_ms: 60_000,
            read_chunk_size: 16 * 1024, // 16 KB
            pipeline_capacity: 10,
            max_depth: DEFAULT_MAX_DEPTH,
            username: None,
            password: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new config builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Check the values a pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(RespipeError::Config("server address is empty".to_string()));
        }
        if self.pipeline_capacity == 0 {
            return Err(RespipeError::Config(
                "pipeline capacity must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(RespipeError::Config("max depth must be at least 1".to_string()));
        }
        if self.read_chunk_size == 0 {
            return Err(RespipeError::Config(
                "read chunk size must be at least 1 byte".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the server address
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum size of one socket read (in bytes)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// Set the maximum number of in-flight commands
    pub fn pipeline_capacity(mut self, capacity: usize) -> Self {
        self.config.pipeline_capacity = capacity;
        self
    }

    /// Set the maximum array nesting accepted in a reply
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
