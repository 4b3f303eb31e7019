//! Link health counters

use tandem_protocol::ErrorKind;

/// Running totals for one link session
///
/// All counters saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Bytes drained from the source
    pub bytes_received: u32,
    /// Frames delivered to the handler
    pub frames_received: u32,
    /// Frames written to the sink
    pub frames_sent: u32,
    pub too_short: u32,
    pub checksum_errors: u32,
    pub length_errors: u32,
    pub overflows: u32,
    pub timeouts: u32,
}

impl LinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_bytes(&mut self, count: usize) {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        self.bytes_received = self.bytes_received.saturating_add(count);
    }

    pub fn record_frame(&mut self) {
        self.frames_received = self.frames_received.saturating_add(1);
    }

    pub fn record_sent(&mut self) {
        self.frames_sent = self.frames_sent.saturating_add(1);
    }

    pub fn record_error(&mut self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::FrameTooShort => &mut self.too_short,
            ErrorKind::ChecksumMismatch { .. } => &mut self.checksum_errors,
            ErrorKind::LengthMismatch { .. } => &mut self.length_errors,
            ErrorKind::BufferOverflow => &mut self.overflows,
            ErrorKind::Timeout => &mut self.timeouts,
        };
        *counter = counter.saturating_add(1);
    }

    /// Total discarded frames and partial frames
    pub fn errors(&self) -> u32 {
        self.too_short
            .saturating_add(self.checksum_errors)
            .saturating_add(self.length_errors)
            .saturating_add(self.overflows)
            .saturating_add(self.timeouts)
    }

    /// Reset every counter to zero
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
