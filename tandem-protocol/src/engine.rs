//! Incremental frame engine
//!
//! Bytes are fed one at a time in arrival order. The engine has two
//! states: idle (hunting for START) and collecting (buffering everything
//! up to END). On END the buffered bytes are split into payload and
//! checksum and validated:
//!
//! 1. at least [`MIN_FRAME_LEN`] bytes were buffered,
//! 2. the last buffered byte equals the wrapping sum of the others,
//! 3. the big-endian length field at payload offsets 2..4 equals
//!    [`derived_length`] of the buffered byte count.
//!
//! Whatever the outcome, the engine is idle with an empty buffer after
//! END, after an overflow and after a timeout.

use heapless::Vec;

use crate::checksum::checksum;
use crate::config::EngineConfig;
use crate::events::{ErrorKind, FrameEvent};
use crate::frame::{FRAME_END, FRAME_START, MIN_FRAME_LEN};

/// Default receive capacity (payload plus checksum byte)
pub const DEFAULT_CAPACITY: usize = 1023;

/// Buffer index of the last fixed header byte
const HEADER_LAST_INDEX: usize = 4;

/// Constant added to the post-header byte count by the length check
const LENGTH_BIAS: usize = 8;

/// Expected value of the declared length field for a frame that buffered
/// `buffered_len` bytes (payload plus checksum) between START and END.
///
/// For `buffered_len > 5` this is `buffered_len + 2`. A frame of exactly
/// five bytes has no bytes after the header and expects 0.
pub const fn derived_length(buffered_len: usize) -> usize {
    let crc_index = buffered_len.saturating_sub(1);
    if HEADER_LAST_INDEX < crc_index {
        let byte_count = crc_index - HEADER_LAST_INDEX - 1;
        byte_count + LENGTH_BIAS
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ParseState {
    /// Waiting for START byte
    Idle,
    /// Buffering payload and checksum until END
    Collecting,
}

/// Byte-at-a-time frame parser with timeout recovery
///
/// `C` bounds the bytes buffered between START and END, checksum
/// included.
#[derive(Debug, Clone)]
pub struct FrameEngine<const C: usize = DEFAULT_CAPACITY> {
    state: ParseState,
    buffer: Vec<u8, C>,
    /// Arrival time of the most recently consumed byte
    last_byte_ms: u32,
    /// Latest time seen through `feed_byte_at` or `tick`
    now_ms: u32,
    config: EngineConfig,
}

impl<const C: usize> Default for FrameEngine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> FrameEngine<C> {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            state: ParseState::Idle,
            buffer: Vec::new(),
            last_byte_ms: 0,
            now_ms: 0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Maximum bytes buffered between START and END
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Returns true while waiting for a START byte
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::Idle
    }

    /// Bytes buffered for the frame in flight
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Arrival time (ms) of the most recently consumed byte
    pub fn last_byte_time(&self) -> u32 {
        self.last_byte_ms
    }

    /// Drop any partial frame and wait for START
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.buffer.clear();
    }

    /// Feed one byte that arrived at `now_ms`
    pub fn feed_byte_at(&mut self, byte: u8, now_ms: u32) -> Option<FrameEvent<C>> {
        self.now_ms = now_ms;
        self.feed_byte(byte)
    }

    /// Feed one byte, stamped with the latest time the engine has seen
    ///
    /// Returns an event when the byte completes a frame or forces a reset.
    pub fn feed_byte(&mut self, byte: u8) -> Option<FrameEvent<C>> {
        self.last_byte_ms = self.now_ms;

        match self.state {
            ParseState::Idle => {
                if byte == FRAME_START {
                    self.buffer.clear();
                    self.state = ParseState::Collecting;
                }
                // Anything else between frames is line noise
                None
            }
            ParseState::Collecting => {
                if byte == FRAME_END {
                    let event = self.complete_frame();
                    self.reset();
                    return Some(event);
                }

                if byte == FRAME_START && self.config.resync_on_start {
                    self.buffer.clear();
                    return None;
                }

                if self.buffer.push(byte).is_err() {
                    self.reset();
                    return Some(FrameEvent::Error {
                        kind: ErrorKind::BufferOverflow,
                    });
                }
                None
            }
        }
    }

    /// Feed a run of bytes that arrived at `now_ms`, reporting every event
    pub fn feed_all_at<F>(&mut self, bytes: &[u8], now_ms: u32, mut on_event: F)
    where
        F: FnMut(FrameEvent<C>),
    {
        for &byte in bytes {
            if let Some(event) = self.feed_byte_at(byte, now_ms) {
                on_event(event);
            }
        }
    }

    /// Advance the clock and drop a stalled partial frame
    ///
    /// Fires once per stalled frame: the reset leaves nothing to time out.
    pub fn tick(&mut self, now_ms: u32) -> Option<FrameEvent<C>> {
        self.now_ms = now_ms;

        let stalled = self.state == ParseState::Collecting
            && !self.buffer.is_empty()
            && now_ms.wrapping_sub(self.last_byte_ms) > self.config.timeout_ms;

        if stalled {
            self.reset();
            Some(FrameEvent::Error {
                kind: ErrorKind::Timeout,
            })
        } else {
            None
        }
    }

    /// Validate the buffered bytes after END
    ///
    /// Leaves the buffer empty; the caller resets the state.
    fn complete_frame(&mut self) -> FrameEvent<C> {
        let buffered_len = self.buffer.len();
        if buffered_len < MIN_FRAME_LEN {
            return FrameEvent::Error {
                kind: ErrorKind::FrameTooShort,
            };
        }

        let mut data = core::mem::take(&mut self.buffer);
        let received = match data.pop() {
            Some(byte) => byte,
            None => {
                return FrameEvent::Error {
                    kind: ErrorKind::FrameTooShort,
                }
            }
        };

        let computed = checksum(&data);
        if received != computed {
            return FrameEvent::Error {
                kind: ErrorKind::ChecksumMismatch { received, computed },
            };
        }

        let declared = u16::from_be_bytes([data[2], data[3]]);
        let derived = derived_length(buffered_len);
        if derived != usize::from(declared) {
            return FrameEvent::Error {
                kind: ErrorKind::LengthMismatch {
                    declared,
                    derived: u16::try_from(derived).unwrap_or(u16::MAX),
                },
            };
        }

        FrameEvent::Received {
            command: data[1],
            subcommand: data.get(5).copied(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;

    type Engine = FrameEngine<32>;

    fn feed(engine: &mut Engine, bytes: &[u8]) -> Option<FrameEvent<32>> {
        let mut last = None;
        for &byte in bytes {
            if let Some(event) = engine.feed_byte(byte) {
                assert!(last.is_none(), "more than one event from {:?}", bytes);
                last = Some(event);
            }
        }
        last
    }

    #[test]
    fn test_derived_length() {
        assert_eq!(derived_length(5), 0);
        assert_eq!(derived_length(6), 8);
        assert_eq!(derived_length(7), 9);
        assert_eq!(derived_length(100), 102);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut engine = Engine::new();
        let event = feed(&mut engine, &[0x3A, 0x01, 0x02, 0x00, 0x09, 0x03, 0xFF, 0x7E]);
        assert_eq!(
            event.and_then(|e| e.error()),
            Some(ErrorKind::ChecksumMismatch {
                received: 0xFF,
                computed: 0x0F
            })
        );
        assert!(engine.is_idle());
        assert_eq!(engine.buffered_len(), 0);
    }

    #[test]
    fn test_length_mismatch() {
        let mut engine = Engine::new();
        // Checksum is right, declared 9 but six bytes buffered derive 8
        let event = feed(&mut engine, &[0x3A, 0x01, 0x02, 0x00, 0x09, 0x03, 0x0F, 0x7E]);
        assert_eq!(
            event.and_then(|e| e.error()),
            Some(ErrorKind::LengthMismatch {
                declared: 9,
                derived: 8
            })
        );
        assert!(engine.is_idle());
    }

    #[test]
    fn test_valid_frame() {
        let mut engine = Engine::new();
        let event = feed(&mut engine, &[0x3A, 0x01, 0x02, 0x00, 0x08, 0x03, 0x0E, 0x7E]).unwrap();

        match event {
            FrameEvent::Received {
                command,
                subcommand,
                data,
            } => {
                assert_eq!(command, 0x02);
                assert_eq!(subcommand, None);
                assert_eq!(data.as_slice(), &[0x01, 0x02, 0x00, 0x08, 0x03]);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(engine.is_idle());
    }

    #[test]
    fn test_subcommand_present() {
        let payload = [0x03, 0x81, 0x00, 0x0A, 0x00, 0x07, 0x55];
        let frame = encode_frame::<16>(&payload).unwrap();

        let mut engine = Engine::new();
        let received = feed(&mut engine, &frame).unwrap().into_received().unwrap();
        assert_eq!(received.command, 0x81);
        assert_eq!(received.subcommand, Some(0x07));
        assert_eq!(received.data.as_slice(), &payload);
    }

    #[test]
    fn test_five_byte_frame_expects_zero_length() {
        let mut engine = Engine::new();

        let ok = encode_frame::<16>(&[0x01, 0x02, 0x00, 0x00]).unwrap();
        assert!(feed(&mut engine, &ok).unwrap().is_received());

        let bad = encode_frame::<16>(&[0x01, 0x02, 0x00, 0x07]).unwrap();
        assert_eq!(
            feed(&mut engine, &bad).and_then(|e| e.error()),
            Some(ErrorKind::LengthMismatch {
                declared: 7,
                derived: 0
            })
        );
    }

    #[test]
    fn test_frame_too_short() {
        let mut engine = Engine::new();
        for short in [&[0x3A, 0x7E][..], &[0x3A, 1, 2, 3, 6, 0x7E][..]] {
            assert_eq!(
                feed(&mut engine, short).and_then(|e| e.error()),
                Some(ErrorKind::FrameTooShort)
            );
            assert!(engine.is_idle());
        }
    }

    #[test]
    fn test_noise_between_frames_is_ignored() {
        let mut engine = Engine::new();
        assert!(feed(&mut engine, &[0x00, 0xFF, 0x7E, 0x12]).is_none());
        assert!(engine.is_idle());

        let event = feed(&mut engine, &[0x3A, 0x01, 0x02, 0x00, 0x08, 0x03, 0x0E, 0x7E]);
        assert!(event.unwrap().is_received());
    }

    #[test]
    fn test_start_inside_frame_is_payload() {
        let payload = [0x01, 0x3A, 0x00, 0x08, 0x03];
        let frame = encode_frame::<16>(&payload).unwrap();

        let mut engine = Engine::new();
        let received = feed(&mut engine, &frame).unwrap().into_received().unwrap();
        assert_eq!(received.command, 0x3A);
        assert_eq!(received.data.as_slice(), &payload);
    }

    #[test]
    fn test_resync_on_start() {
        let config = EngineConfig::default().with_resync_on_start(true);
        let mut engine = Engine::with_config(config);

        // Partial frame whose END was lost, then a complete frame
        let mut stream = Vec::<u8, 32>::new();
        stream.extend_from_slice(&[0x3A, 0x09, 0x09]).unwrap();
        stream
            .extend_from_slice(&[0x3A, 0x01, 0x02, 0x00, 0x08, 0x03, 0x0E, 0x7E])
            .unwrap();

        let received = feed(&mut engine, &stream).unwrap().into_received().unwrap();
        assert_eq!(received.data.as_slice(), &[0x01, 0x02, 0x00, 0x08, 0x03]);
    }

    #[test]
    fn test_overflow() {
        let mut engine = FrameEngine::<8>::new();
        assert!(engine.feed_byte(0x3A).is_none());
        for _ in 0..8 {
            assert!(engine.feed_byte(0x11).is_none());
        }
        assert_eq!(engine.buffered_len(), 8);

        let event = engine.feed_byte(0x11);
        assert_eq!(
            event.and_then(|e| e.error()),
            Some(ErrorKind::BufferOverflow)
        );
        assert!(engine.is_idle());
        assert_eq!(engine.buffered_len(), 0);

        // Tail of the oversized frame is noise, END included
        assert!(engine.feed_byte(0x11).is_none());
        assert!(engine.feed_byte(0x7E).is_none());
    }

    #[test]
    fn test_recovers_after_overflow() {
        let mut engine = FrameEngine::<8>::new();
        engine.feed_byte(0x3A);
        for _ in 0..9 {
            engine.feed_byte(0x00);
        }
        assert!(engine.is_idle());

        let frame = encode_frame::<16>(&[0x01, 0x02, 0x00, 0x08, 0x03]).unwrap();
        let mut received = 0;
        for &byte in frame.iter() {
            if let Some(event) = engine.feed_byte(byte) {
                assert!(event.is_received());
                received += 1;
            }
        }
        assert_eq!(received, 1);
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut engine = Engine::new();
        engine.feed_byte_at(0x3A, 1_000);
        engine.feed_byte_at(0x01, 1_010);
        assert_eq!(engine.last_byte_time(), 1_010);

        assert!(engine.tick(1_110).is_none()); // exactly 100 ms: not yet
        assert_eq!(
            engine.tick(1_111).and_then(|e| e.error()),
            Some(ErrorKind::Timeout)
        );
        assert!(engine.is_idle());
        assert_eq!(engine.buffered_len(), 0);
        assert!(engine.tick(5_000).is_none());
    }

    #[test]
    fn test_no_timeout_without_payload() {
        let mut engine = Engine::new();
        assert!(engine.tick(10_000).is_none());

        engine.feed_byte_at(0x3A, 10_000);
        assert!(engine.tick(20_000).is_none());
        assert!(!engine.is_idle());
    }

    #[test]
    fn test_timeout_clock_wraps() {
        let mut engine = Engine::new();
        engine.feed_byte_at(0x3A, u32::MAX - 20);
        engine.feed_byte_at(0x01, u32::MAX - 10);

        assert!(engine.tick(50).is_none());
        assert_eq!(
            engine.tick(100).and_then(|e| e.error()),
            Some(ErrorKind::Timeout)
        );
    }

    #[test]
    fn test_configured_timeout() {
        let mut engine = Engine::with_config(EngineConfig::default().with_timeout_ms(1_000));
        engine.feed_byte_at(0x3A, 0);
        engine.feed_byte_at(0x01, 0);
        assert!(engine.tick(500).is_none());
        assert!(engine.tick(1_001).is_some());
    }

    #[test]
    fn test_feed_byte_uses_last_tick_time() {
        let mut engine = Engine::new();
        engine.tick(400);
        engine.feed_byte(0x3A);
        engine.feed_byte(0x01);
        assert_eq!(engine.last_byte_time(), 400);
        assert!(engine.tick(500).is_none());
        assert!(engine.tick(501).is_some());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = Engine::new();
        feed(&mut engine, &[0x3A, 0x01, 0x02]);
        assert!(!engine.is_idle());

        engine.reset();
        assert!(engine.is_idle());
        assert_eq!(engine.buffered_len(), 0);

        engine.reset();
        assert!(engine.is_idle());
        assert_eq!(engine.buffered_len(), 0);
    }

    #[test]
    fn test_feed_all_reports_every_event() {
        let mut engine = Engine::new();
        let mut stream = Vec::<u8, 32>::new();
        stream
            .extend_from_slice(&[0x3A, 0x01, 0x02, 0x00, 0x09, 0x03, 0xFF, 0x7E])
            .unwrap();
        stream
            .extend_from_slice(&[0x3A, 0x01, 0x02, 0x00, 0x08, 0x03, 0x0E, 0x7E])
            .unwrap();

        let mut received = 0;
        let mut errors = 0;
        engine.feed_all_at(&stream, 42, |event| {
            if event.is_received() {
                received += 1;
            } else {
                errors += 1;
            }
        });
        assert_eq!((received, errors), (1, 1));
        assert_eq!(engine.last_byte_time(), 42);
    }
}
