//! Polled link session
//!
//! A [`Link`] owns the receive engine for one transport session. The
//! embedding firmware calls [`Link::poll`] periodically: pending bytes
//! are drained from the source and fed to the engine, and when nothing
//! arrived the stalled-frame timeout is evaluated instead. Decoded frames
//! reach the [`FrameHandler`] before `poll` returns.

use tandem_hal::{ByteSink, ByteSource, MonotonicClock};
use tandem_protocol::{
    build_command_payload, checksum, CommandHeader, EncodeError, FrameEngine, FrameEvent,
    DEFAULT_CAPACITY, FRAME_END, FRAME_START,
};

use crate::config::{LinkConfig, RX_CHUNK_SIZE};
use crate::handler::FrameHandler;
use crate::stats::LinkStats;

/// Errors surfaced by link operations
///
/// Malformed frames are not errors here; they go to
/// [`FrameHandler::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<R, W> {
    /// The byte source failed
    Source(R),
    /// The byte sink failed
    Sink(W),
    /// An outbound payload could not be built
    Encode(EncodeError),
}

/// One transport session: engine, collaborators and counters
pub struct Link<S, K, T, H, const C: usize = DEFAULT_CAPACITY> {
    source: S,
    sink: K,
    clock: T,
    handler: H,
    engine: FrameEngine<C>,
    config: LinkConfig,
    stats: LinkStats,
}

impl<S, K, T, H, const C: usize> Link<S, K, T, H, C>
where
    S: ByteSource,
    K: ByteSink,
    T: MonotonicClock,
    H: FrameHandler,
{
    pub fn new(source: S, sink: K, clock: T, handler: H, config: LinkConfig) -> Self {
        Self {
            source,
            sink,
            clock,
            handler,
            engine: FrameEngine::with_config(config.engine),
            config,
            stats: LinkStats::new(),
        }
    }

    /// Drain pending bytes, or check for a stalled frame if there were none
    ///
    /// Returns the number of bytes consumed.
    pub fn poll(&mut self) -> Result<usize, LinkError<S::Error, K::Error>> {
        let now = self.clock.now_ms();
        let mut buf = [0u8; RX_CHUNK_SIZE];
        let mut total = 0;

        loop {
            let n = self
                .source
                .read_available(&mut buf)
                .map_err(LinkError::Source)?
                .min(buf.len());
            if n == 0 {
                break;
            }

            #[cfg(feature = "defmt")]
            defmt::trace!("RX: {} bytes", n);

            total += n;
            for &byte in &buf[..n] {
                if let Some(event) = self.engine.feed_byte_at(byte, now) {
                    self.dispatch(event);
                }
            }

            // A short read means the source is drained
            if n < buf.len() {
                break;
            }
        }

        if total == 0 {
            if let Some(event) = self.engine.tick(now) {
                self.dispatch(event);
            }
        } else {
            self.stats.record_bytes(total);
        }

        Ok(total)
    }

    /// Run the stalled-frame check at the current time
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        if let Some(event) = self.engine.tick(now) {
            self.dispatch(event);
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Send `payload` as one frame
    pub fn send_frame(&mut self, payload: &[u8]) -> Result<(), LinkError<S::Error, K::Error>> {
        let trailer = [checksum(payload), FRAME_END];

        self.sink
            .write_all(&[FRAME_START])
            .map_err(LinkError::Sink)?;
        self.sink.write_all(payload).map_err(LinkError::Sink)?;
        self.sink.write_all(&trailer).map_err(LinkError::Sink)?;
        if self.config.flush_after_send {
            self.sink.flush().map_err(LinkError::Sink)?;
        }

        self.stats.record_sent();

        #[cfg(feature = "defmt")]
        defmt::debug!("Sent frame: {} payload bytes", payload.len());

        Ok(())
    }

    /// Send a data payload, refusing an empty one
    pub fn send_data(&mut self, payload: &[u8]) -> Result<(), LinkError<S::Error, K::Error>> {
        if payload.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Refusing to send empty payload");
            return Err(LinkError::Encode(EncodeError::EmptyPayload));
        }
        self.send_frame(payload)
    }

    /// Build a command payload with a valid length field and send it
    ///
    /// The payload plus its checksum byte must fit a peer engine of the
    /// same capacity `C`.
    pub fn send_command(
        &mut self,
        header: &CommandHeader,
        body: &[u8],
    ) -> Result<(), LinkError<S::Error, K::Error>> {
        let payload = build_command_payload::<C>(header, body).map_err(LinkError::Encode)?;
        if payload.len() >= C {
            #[cfg(feature = "defmt")]
            defmt::warn!("Command payload of {} bytes exceeds peer capacity", payload.len());
            return Err(LinkError::Encode(EncodeError::BufferTooSmall));
        }
        self.send_frame(&payload)
    }

    fn dispatch(&mut self, event: FrameEvent<C>) {
        match event {
            FrameEvent::Received {
                command,
                subcommand,
                data,
            } => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "Frame received: command {=u8:#x}, subcommand {:?}, {} bytes",
                    command,
                    subcommand,
                    data.len()
                );

                self.stats.record_frame();
                self.handler.on_frame(command, subcommand, &data);
                self.handler.on_raw(&data);
            }
            FrameEvent::Error { kind } => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Frame dropped: {:?}", kind);

                self.stats.record_error(kind);
                self.handler.on_error(kind);
            }
        }
    }
}

impl<S, K, T, H, const C: usize> Link<S, K, T, H, C> {
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn engine(&self) -> &FrameEngine<C> {
        &self.engine
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Take the collaborators back, dropping the engine state
    pub fn into_parts(self) -> (S, K, T, H) {
        (self.source, self.sink, self.clock, self.handler)
    }
}
