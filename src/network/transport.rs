//! Socket Transport
//!
//! The pipeline treats its socket as a raw byte pipe behind [`Transport`].
//! [`TcpTransport`] is the production implementation.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::{RespipeError, Result};

/// Byte transport consumed by the pipeline
pub trait Transport {
    /// Write all of `buf`, retrying short writes until done or failed
    fn send_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Read up to `buf.len()` bytes. `Ok(0)` means the peer closed.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Wait up to `timeout` for incoming data or EOF.
    ///
    /// `Some(Duration::ZERO)` polls without waiting, `None` waits forever.
    fn is_readable(&mut self, timeout: Option<Duration>) -> io::Result<bool>;

    fn close(&mut self) -> io::Result<()>;
}

/// Blocking TCP transport
pub struct TcpTransport {
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpTransport {
    /// Resolve `config.addr` and connect to the first address that accepts
    pub fn connect(config: &PipelineConfig) -> Result<Self> {
        let mut last_err = None;
        for addr in config.addr.to_socket_addrs()? {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(match last_err {
            Some(e) => RespipeError::Io(e),
            None => RespipeError::Config(format!("address {} resolved to nothing", config.addr)),
        })
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: &PipelineConfig) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm: pipelined commands are small
        stream.set_nodelay(true)?;
        stream.set_write_timeout(config.write_timeout())?;

        Ok(Self { stream, peer_addr })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Transport for TcpTransport {
    fn send_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf)?;
        self.stream.flush()
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.stream.read(buf) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    fn is_readable(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        let mut probe = [0u8; 1];
        let result = loop {
            let peeked = match timeout {
                // A zero read timeout is rejected by the OS, poll instead
                Some(t) if t.is_zero() => {
                    self.stream.set_nonblocking(true)?;
                    let peeked = self.stream.peek(&mut probe);
                    self.stream.set_nonblocking(false)?;
                    peeked
                }
                other => {
                    self.stream.set_read_timeout(other)?;
                    self.stream.peek(&mut probe)
                }
            };
            match peeked {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match result {
            // Ok(0) is EOF, which the following recv reports
            Ok(_) => Ok(true),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}
