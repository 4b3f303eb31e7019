//! Link configuration

use tandem_protocol::EngineConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bytes pulled from the source per read
pub const RX_CHUNK_SIZE: usize = 64;

/// Link session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Receive engine settings
    pub engine: EngineConfig,
    /// Flush the sink after every outbound frame
    pub flush_after_send: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            flush_after_send: true,
        }
    }
}

impl LinkConfig {
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_flush_after_send(mut self, enabled: bool) -> Self {
        self.flush_after_send = enabled;
        self
    }
}
