//! Frame encoding for the Tandem link.
//!
//! Frame format:
//! - START (1 byte): 0x3A
//! - PAYLOAD (variable): command/data bytes
//! - CHECKSUM (1 byte): wrapping sum of the PAYLOAD bytes
//! - END (1 byte): 0x7E
//!
//! Neither delimiter is escaped. A 0x3A inside a payload is plain data to
//! the receiver. A 0x7E anywhere between START and END terminates the
//! frame early, and that includes bytes the encoder writes itself:
//! - the checksum byte, whenever the payload sums to 0x7E,
//! - a command length field of 0x7E (a 123 byte command payload).
//!
//! `encode_frame` puts such frames on the wire as given;
//! `build_command_payload` refuses to build them.

use heapless::Vec;

use crate::checksum::checksum;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0x3A;

/// Frame terminator byte
pub const FRAME_END: u8 = 0x7E;

/// Minimum bytes between START and END (payload header plus checksum)
pub const MIN_FRAME_LEN: usize = 5;

/// Bytes added around the payload (START + CHECKSUM + END)
pub const FRAME_OVERHEAD: usize = 3;

/// Errors that can occur while encoding an outbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Destination buffer cannot hold the encoded frame
    BufferTooSmall,
    /// Payload is empty
    EmptyPayload,
    /// END would appear in the payload or checksum byte
    ContainsFrameEnd,
}

/// Total encoded size of a frame carrying `payload_len` bytes
pub const fn encoded_len(payload_len: usize) -> usize {
    payload_len + FRAME_OVERHEAD
}

/// Encode `payload` into `buffer`
///
/// Returns the number of bytes written.
pub fn encode_frame_into(payload: &[u8], buffer: &mut [u8]) -> Result<usize, EncodeError> {
    let frame_len = encoded_len(payload.len());
    if buffer.len() < frame_len {
        return Err(EncodeError::BufferTooSmall);
    }

    buffer[0] = FRAME_START;
    buffer[1..1 + payload.len()].copy_from_slice(payload);
    buffer[1 + payload.len()] = checksum(payload);
    buffer[2 + payload.len()] = FRAME_END;

    Ok(frame_len)
}

/// Encode `payload` into a heapless Vec of capacity `N`
pub fn encode_frame<const N: usize>(payload: &[u8]) -> Result<Vec<u8, N>, EncodeError> {
    let mut frame = Vec::new();
    frame
        .push(FRAME_START)
        .map_err(|_| EncodeError::BufferTooSmall)?;
    frame
        .extend_from_slice(payload)
        .map_err(|_| EncodeError::BufferTooSmall)?;
    frame
        .push(checksum(payload))
        .map_err(|_| EncodeError::BufferTooSmall)?;
    frame
        .push(FRAME_END)
        .map_err(|_| EncodeError::BufferTooSmall)?;
    Ok(frame)
}

/// Encode a command payload, refusing an empty one
///
/// A frame with nothing between START and the checksum can never pass
/// the receiver's validation, so it is rejected here instead of being put
/// on the wire.
pub fn encode_command_frame<const N: usize>(payload: &[u8]) -> Result<Vec<u8, N>, EncodeError> {
    if payload.is_empty() {
        return Err(EncodeError::EmptyPayload);
    }
    encode_frame(payload)
}
