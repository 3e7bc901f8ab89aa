//! Command Helpers
//!
//! Thin wrappers over [`Pipeline::submit`]. None of them wait for a reply;
//! fetch it with `get_response` or `flush_pipeline`.

use crate::error::Result;
use crate::protocol::{Command, ToArg};
use super::pipeline::Pipeline;
use super::transport::Transport;

impl<T: Transport> Pipeline<T> {
    /// SET key value
    pub fn set(&mut self, key: impl ToArg, value: impl ToArg) -> Result<()> {
        self.submit(&Command::new("SET").arg(key).arg(value))
    }

    /// GET key
    pub fn get(&mut self, key: impl ToArg) -> Result<()> {
        self.submit(&Command::new("GET").arg(key))
    }

    /// HSET key field value
    pub fn hset(&mut self, key: impl ToArg, field: impl ToArg, value: impl ToArg) -> Result<()> {
        self.submit(&Command::new("HSET").arg(key).arg(field).arg(value))
    }

    /// SADD key member
    pub fn sadd(&mut self, key: impl ToArg, member: impl ToArg) -> Result<()> {
        self.submit(&Command::new("SADD").arg(key).arg(member))
    }

    /// RPUSH key value
    pub fn rpush(&mut self, key: impl ToArg, value: impl ToArg) -> Result<()> {
        self.submit(&Command::new("RPUSH").arg(key).arg(value))
    }

    /// ZADD key score member (note the argument order on the wire)
    pub fn zadd(&mut self, key: impl ToArg, member: impl ToArg, score: f64) -> Result<()> {
        self.submit(&Command::new("ZADD").arg(key).arg(score).arg(member))
    }

    /// EXPIREAT key unix-seconds
    pub fn expireat(&mut self, key: impl ToArg, unix_time: i64) -> Result<()> {
        self.submit(&Command::new("EXPIREAT").arg(key).arg(unix_time))
    }

    pub fn flushdb(&mut self) -> Result<()> {
        self.submit(&Command::new("FLUSHDB"))
    }

    pub fn ping(&mut self) -> Result<()> {
        self.submit(&Command::new("PING"))
    }
}
