//! Command payload layout
//!
//! Command payloads carry a fixed six byte header ahead of the body:
//!
//! ```text
//! ┌────────┬─────────┬────────┬────────┬───────┬────────────┬──────────┐
//! │ device │ command │ len_hi │ len_lo │ flags │ subcommand │ body ... │
//! └────────┴─────────┴────────┴────────┴───────┴────────────┴──────────┘
//! ```
//!
//! The length field holds whatever the receiving engine derives from the
//! frame size, i.e. payload length + 3.

use heapless::{String, Vec};

use crate::checksum::checksum;
use crate::engine::derived_length;
use crate::events::ReceivedFrame;
use crate::frame::{EncodeError, FRAME_END};

/// Bytes ahead of the body in a command payload
pub const COMMAND_HEADER_LEN: usize = 6;

/// Separator between text fields in a body (e.g. `ssid.password`)
pub const FIELD_SEPARATOR: u8 = b'.';

/// Fixed header of a command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandHeader {
    /// Target or source device address
    pub device: u8,
    /// Command code
    pub command: u8,
    /// Free-form flag byte
    pub flags: u8,
    /// Sub-command code
    pub subcommand: u8,
}

impl CommandHeader {
    pub fn new(device: u8, command: u8, subcommand: u8) -> Self {
        Self {
            device,
            command,
            flags: 0,
            subcommand,
        }
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }
}

/// Build a command payload whose length field will pass validation
///
/// Fails with [`EncodeError::ContainsFrameEnd`] when the header, the body
/// or the checksum of the result would carry an END byte.
pub fn build_command_payload<const N: usize>(
    header: &CommandHeader,
    body: &[u8],
) -> Result<Vec<u8, N>, EncodeError> {
    let payload_len = COMMAND_HEADER_LEN + body.len();
    // The receiver buffers the checksum byte as well
    let declared =
        u16::try_from(derived_length(payload_len + 1)).map_err(|_| EncodeError::BufferTooSmall)?;
    let [len_hi, len_lo] = declared.to_be_bytes();

    let mut payload = Vec::new();
    payload
        .extend_from_slice(&[
            header.device,
            header.command,
            len_hi,
            len_lo,
            header.flags,
            header.subcommand,
        ])
        .map_err(|_| EncodeError::BufferTooSmall)?;
    payload
        .extend_from_slice(body)
        .map_err(|_| EncodeError::BufferTooSmall)?;

    if payload.contains(&FRAME_END) || checksum(&payload) == FRAME_END {
        return Err(EncodeError::ContainsFrameEnd);
    }
    Ok(payload)
}

impl<const C: usize> ReceivedFrame<C> {
    /// Header fields, if the payload carries a full command header
    pub fn header(&self) -> Option<CommandHeader> {
        if self.data.len() < COMMAND_HEADER_LEN {
            return None;
        }
        Some(CommandHeader {
            device: self.data[0],
            command: self.data[1],
            flags: self.data[4],
            subcommand: self.data[5],
        })
    }

    /// Bytes after the sub-command
    pub fn body(&self) -> &[u8] {
        self.data.get(COMMAND_HEADER_LEN..).unwrap_or(&[])
    }

    /// Split the body at the first `separator`
    ///
    /// Returns `None` when the separator is absent.
    pub fn split_body(&self, separator: u8) -> Option<(&[u8], &[u8])> {
        let body = self.body();
        let pos = body.iter().position(|&b| b == separator)?;
        Some((&body[..pos], &body[pos + 1..]))
    }
}

/// Render bytes as printable ASCII, substituting `.` for anything else
///
/// Output stops at `N` characters.
pub fn printable_ascii<const N: usize>(bytes: &[u8]) -> String<N> {
    let mut text = String::new();
    for &byte in bytes {
        let ch = if (0x20..=0x7E).contains(&byte) {
            byte as char
        } else {
            '.'
        };
        if text.push(ch).is_err() {
            break;
        }
    }
    text
}

/// Parse space-separated two-digit hex tokens ("48 65 6C")
///
/// Tokens that are not exactly two hex digits are skipped. Parsing stops
/// once `N` bytes have been collected.
pub fn parse_hex_bytes<const N: usize>(text: &str) -> Vec<u8, N> {
    let mut bytes = Vec::new();
    for token in text.split(' ').filter(|t| !t.is_empty()) {
        if token.len() != 2 {
            continue;
        }
        let Ok(byte) = u8::from_str_radix(token, 16) else {
            continue;
        };
        if bytes.push(byte).is_err() {
            break;
        }
    }
    bytes
}
