//! Events produced by the frame engine

use heapless::Vec;

/// Why a frame (or partial frame) was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Fewer than 5 bytes between START and END
    FrameTooShort,
    /// Trailing checksum byte does not match the payload sum
    ChecksumMismatch { received: u8, computed: u8 },
    /// Declared length field disagrees with the received byte count
    LengthMismatch { declared: u16, derived: u16 },
    /// Frame grew past the engine's buffer capacity
    BufferOverflow,
    /// Partial frame went silent for longer than the configured timeout
    Timeout,
}

impl ErrorKind {
    /// Short static label, used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FrameTooShort => "frame too short",
            ErrorKind::ChecksumMismatch { .. } => "checksum mismatch",
            ErrorKind::LengthMismatch { .. } => "length mismatch",
            ErrorKind::BufferOverflow => "buffer overflow",
            ErrorKind::Timeout => "timeout",
        }
    }

    /// Returns true if a complete START..END frame was seen but rejected
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::FrameTooShort
                | ErrorKind::ChecksumMismatch { .. }
                | ErrorKind::LengthMismatch { .. }
        )
    }
}

/// Output of one engine step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent<const C: usize> {
    /// A frame passed checksum and length validation
    Received {
        /// Payload byte 1
        command: u8,
        /// Payload byte 5, if the payload is long enough
        subcommand: Option<u8>,
        /// Payload without the checksum byte
        data: Vec<u8, C>,
    },
    /// Something was discarded; the engine is back to idle
    Error { kind: ErrorKind },
}

impl<const C: usize> FrameEvent<C> {
    /// Convert into a [`ReceivedFrame`], if this is a delivery
    pub fn into_received(self) -> Option<ReceivedFrame<C>> {
        match self {
            FrameEvent::Received {
                command,
                subcommand,
                data,
            } => Some(ReceivedFrame {
                command,
                subcommand,
                data,
            }),
            FrameEvent::Error { .. } => None,
        }
    }

    /// The error kind, if this is an error
    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            FrameEvent::Error { kind } => Some(*kind),
            FrameEvent::Received { .. } => None,
        }
    }

    /// Returns true if this event delivers a frame
    pub fn is_received(&self) -> bool {
        matches!(self, FrameEvent::Received { .. })
    }
}

#[cfg(feature = "defmt")]
impl<const C: usize> defmt::Format for FrameEvent<C> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            FrameEvent::Received {
                command,
                subcommand,
                data,
            } => defmt::write!(
                f,
                "Received {{ command: {=u8:#x}, subcommand: {:?}, len: {=usize} }}",
                command,
                subcommand,
                data.len()
            ),
            FrameEvent::Error { kind } => defmt::write!(f, "Error {{ kind: {:?} }}", kind),
        }
    }
}

/// A delivered frame, detached from the event enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame<const C: usize> {
    pub command: u8,
    pub subcommand: Option<u8>,
    pub data: Vec<u8, C>,
}

impl<const C: usize> ReceivedFrame<C> {
    /// Declared length field (payload offsets 2..4, big-endian)
    pub fn declared_length(&self) -> Option<u16> {
        match (self.data.get(2), self.data.get(3)) {
            (Some(&hi), Some(&lo)) => Some(u16::from_be_bytes([hi, lo])),
            _ => None,
        }
    }
}
