//! Tandem link session
//!
//! Ties the frame engine to a byte source, a byte sink and a millisecond
//! clock. The firmware owns exactly one [`Link`] per transport and drives
//! it from its receive poll; there is no global instance.
//!
//! ```text
//!   ByteSource ──► Link::poll ──► FrameEngine ──► FrameHandler
//!                      ▲                              │
//!   MonotonicClock ────┘        Link::send_* ◄────────┘ (via caller)
//!                                    │
//!                                    ▼
//!                                ByteSink
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod handler;
pub mod link;
pub mod stats;

pub use config::{LinkConfig, RX_CHUNK_SIZE};
pub use handler::FrameHandler;
pub use link::{Link, LinkError};
pub use stats::LinkStats;
