//! Tandem transport abstractions
//!
//! Narrow traits through which the link reaches its collaborators. The
//! board crate configures the UART (pins, baud rate, driver) and hands
//! the link something that implements these.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  tandem-link (session)       │
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │  tandem-hal (this crate)     │
//! └──────────────────────────────┘
//!                │
//!      ┌─────────┴──────────┐
//!      ▼                    ▼
//! ┌───────────┐       ┌───────────────┐
//! │embedded-io│       │ embassy-time  │
//! │  drivers  │       │ (optional)    │
//! └───────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::ByteSource`], [`uart::ByteSink`] - Serial bytes in and out
//! - [`clock::MonotonicClock`] - Millisecond timestamps

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod uart;

pub use clock::MonotonicClock;
#[cfg(feature = "embassy-time")]
pub use clock::EmbassyClock;
pub use uart::{ByteSink, ByteSource, IoSink, IoSource};
