//! Pipelined Connection
//!
//! Owns the socket and the reply decoder, serializes commands, and bounds the
//! number of commands in flight.
//!
//! ## Flow Control
//! ```text
//!  submit ──► drain replies already readable (never waits)
//!               │ still pending >= capacity?
//!               ├── yes ──► blocking drain down to capacity - 1
//!               ▼
//!             encode ──► send_all ──► pending += 1
//!
//!  get_response(block) ──► queued reply? ──► return it
//!                            │ no
//!                            ├── block:  drain down to pending - 1
//!                            └── !block: drain whatever is readable
//! ```
//!
//! Replies are matched to commands purely by order: the protocol has no
//! request ids. `pending` drops by one each time the decoder completes a
//! top-level reply, through the decoder's completion hook.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::{RespipeError, Result};
use crate::protocol::{encode_command, Command, Decoder, ReplyValue, ToArg};
use super::transport::{TcpTransport, Transport};

/// A pipelined client connection
///
/// Single threaded by design: one caller drives one socket. Any socket
/// failure, timeout or malformed reply disconnects the pipeline for good;
/// every later call fails fast with [`RespipeError::Disconnected`] without
/// touching the socket.
pub struct Pipeline<T: Transport = TcpTransport> {
    transport: T,

    decoder: Decoder,

    /// Commands sent whose replies are not yet complete.
    ///
    /// Shared with the decoder's completion hook. The hook must be `Send` so
    /// that a `Pipeline` can move between threads, hence an atomic rather
    /// than `Rc<Cell<_>>`; it is never touched from two threads at once.
    pending: Arc<AtomicUsize>,

    connected: bool,

    /// Reason for the disconnect, kept for later errors
    last_error: Option<String>,

    /// Max commands in flight
    capacity: usize,

    /// Bound on a blocking wait, `None` waits forever
    read_timeout: Option<Duration>,

    read_buf: Vec<u8>,
    write_buf: Vec<u8>,
}

impl Pipeline<TcpTransport> {
    /// Connect over TCP and authenticate if a password is configured
    pub fn connect(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let transport = TcpTransport::connect(&config)?;
        tracing::debug!("Connected to {}", transport.peer_addr());
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> Pipeline<T> {
    /// Build a pipeline over an already connected transport.
    ///
    /// Runs the AUTH handshake when `config.password` is set.
    pub fn with_transport(transport: T, config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let pending = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pending);
        let mut decoder = Decoder::with_completion_hook(move || {
            // Unsolicited replies must not wrap the counter
            let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                n.checked_sub(1)
            });
        });
        decoder.set_max_depth(config.max_depth);

        let mut pipeline = Self {
            transport,
            decoder,
            pending,
            connected: true,
            last_error: None,
            capacity: config.pipeline_capacity,
            read_timeout: config.read_timeout(),
            read_buf: vec![0u8; config.read_chunk_size],
            write_buf: Vec::with_capacity(256),
        };

        if let Some(password) = config.password.as_deref() {
            pipeline.authenticate(config.username.as_deref(), password)?;
        }
        Ok(pipeline)
    }

    /// Send AUTH and wait for its reply.
    ///
    /// Only a literal `+OK` succeeds. An error reply or any other value is an
    /// authentication failure; a dead socket stays a disconnect.
    fn authenticate(&mut self, username: Option<&str>, password: &str) -> Result<()> {
        let mut command = Command::new("AUTH");
        if let Some(username) = username {
            command.push_arg(username);
        }
        command.push_arg(password);
        self.submit(&command)?;

        match self.get_response(true)? {
            Some(reply) if reply.is_ok() => {
                tracing::debug!("Authenticated");
                Ok(())
            }
            Some(ReplyValue::Error(message)) => Err(RespipeError::Authentication(message)),
            Some(other) => Err(RespipeError::Authentication(format!(
                "unexpected reply: {}",
                other
            ))),
            None => Err(RespipeError::Authentication("no reply to AUTH".to_string())),
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Queue a command on the wire.
    ///
    /// Blocks while the pipeline is full, i.e. until the server has answered
    /// enough earlier commands to bring `pending` below `capacity`.
    pub fn submit(&mut self, command: &Command) -> Result<()> {
        if !self.connected {
            return Err(self.disconnected());
        }
        if command.is_empty() {
            return Err(RespipeError::InvalidCommand("command has no name".to_string()));
        }

        self.drain_until(0, false)?;
        if self.pending() >= self.capacity {
            tracing::debug!(
                "Pipeline full ({} pending), waiting for replies",
                self.pending()
            );
            // Drain to capacity - 1, not 0: the next command goes out as
            // soon as one slot frees up
            self.drain_until(self.capacity - 1, true)?;
        }

        self.write_buf.clear();
        encode_command(command, &mut self.write_buf);
        if let Err(e) = self.transport.send_all(&self.write_buf) {
            return Err(self.disconnect(format!("write failed: {}", e)));
        }

        self.pending.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            "Submitted {} ({} pending)",
            String::from_utf8_lossy(command.name().unwrap_or_default()),
            self.pending()
        );
        Ok(())
    }

    /// `submit` for a command given as name plus arguments
    pub fn submit_args<I, A>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = A>,
        A: ToArg,
    {
        self.submit(&Command::from_args(args))
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    /// Read from the socket until at most `target` commands are pending.
    ///
    /// Non-blocking mode stops as soon as the socket has nothing to read,
    /// leaving a partial drain. Blocking mode waits up to the read timeout
    /// per read; running out of time counts as a disconnect.
    pub fn drain_until(&mut self, target: usize, block: bool) -> Result<()> {
        if self.pending() > 0 && !self.connected {
            return Err(self.disconnected());
        }

        while self.pending() > target {
            let wait = if block { self.read_timeout } else { Some(Duration::ZERO) };
            match self.transport.is_readable(wait) {
                Ok(true) => {}
                Ok(false) if !block => break,
                Ok(false) => {
                    return Err(self.disconnect("timed out waiting for reply".to_string()))
                }
                Err(e) => return Err(self.disconnect(format!("poll failed: {}", e))),
            }

            let n = match self.transport.recv(&mut self.read_buf) {
                Ok(0) => return Err(self.disconnect("socket closed".to_string())),
                Ok(n) => n,
                Err(e) => return Err(self.disconnect(format!("read failed: {}", e))),
            };
            tracing::trace!("Read {} bytes", n);

            if let Err(e) = self.decoder.feed(&self.read_buf[..n]) {
                return Err(self.disconnect(format!("protocol error: {}", e)));
            }
        }
        Ok(())
    }

    /// Next reply in submission order.
    ///
    /// With `block`, waits until at least one more reply completes (unless
    /// nothing is pending). Without it, only reads what is already there and
    /// may return `None`.
    pub fn get_response(&mut self, block: bool) -> Result<Option<ReplyValue>> {
        if let Some(reply) = self.decoder.take_next() {
            return Ok(Some(reply));
        }

        if block {
            let target = self.pending().saturating_sub(1);
            self.drain_until(target, true)?;
        } else {
            self.drain_until(0, false)?;
        }
        Ok(self.decoder.take_next())
    }

    /// Wait for every pending reply and return all queued replies, oldest first
    pub fn flush_pipeline(&mut self) -> Result<Vec<ReplyValue>> {
        self.drain_until(0, true)?;
        Ok(self.decoder.drain_completed())
    }

    // =========================================================================
    // Lifecycle / Accessors
    // =========================================================================

    /// Shut the socket down. The pipeline is disconnected afterwards.
    pub fn close(&mut self) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;
        self.last_error = Some("closed by client".to_string());
        self.transport.close()?;
        Ok(())
    }

    /// Commands sent whose replies have not completed yet
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Why the pipeline disconnected, if it did
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Completed replies not yet retrieved
    pub fn queued(&self) -> usize {
        self.decoder.queued()
    }

    /// Borrow the underlying transport
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    ///
    /// Reading from or writing to it directly desynchronizes reply matching.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn disconnect(&mut self, reason: String) -> RespipeError {
        tracing::warn!("Disconnected: {}", reason);
        self.connected = false;
        self.last_error = Some(reason.clone());
        RespipeError::Disconnected(reason)
    }

    fn disconnected(&self) -> RespipeError {
        RespipeError::Disconnected(
            self.last_error
                .clone()
                .unwrap_or_else(|| "not connected".to_string()),
        )
    }
}
