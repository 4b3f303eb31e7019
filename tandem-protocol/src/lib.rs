//! Tandem Frame Protocol
//!
//! This crate defines the serial framing used between a host and its
//! companion peripheral controller (servo/motor/sensor I/O expander).
//! Both directions use the same frame, and the receive side is parsed one
//! byte at a time so it can run from a polled or interrupt-drained path.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────┬──────────────────────────────────────────┬──────────┬─────┐
//! │ START │ PAYLOAD                                  │ CHECKSUM │ END │
//! │ 0x3A  │ dev cmd len_hi len_lo flags sub body...  │ 1B       │0x7E │
//! └───────┴──────────────────────────────────────────┴──────────┴─────┘
//! ```
//!
//! The checksum is the wrapping byte sum of the payload. A frame is only
//! delivered when both the checksum and the declared length field agree
//! with what was received; see [`engine`] for the exact rules.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod config;
pub mod engine;
pub mod events;
pub mod frame;
pub mod messages;

pub use checksum::checksum;
pub use config::{EngineConfig, DEFAULT_TIMEOUT_MS};
pub use engine::{derived_length, FrameEngine, DEFAULT_CAPACITY};
pub use events::{ErrorKind, FrameEvent, ReceivedFrame};
pub use frame::{
    encode_command_frame, encode_frame, encode_frame_into, encoded_len, EncodeError, FRAME_END,
    FRAME_START, MIN_FRAME_LEN,
};
pub use messages::{
    build_command_payload, parse_hex_bytes, printable_ascii, CommandHeader, COMMAND_HEADER_LEN,
    FIELD_SEPARATOR,
};
