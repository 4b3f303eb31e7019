//! Frame engine configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time a partial frame may sit without new bytes before it is dropped
pub const DEFAULT_TIMEOUT_MS: u32 = 100;

/// Runtime options for a [`FrameEngine`](crate::FrameEngine)
///
/// Buffer capacity is a const generic on the engine and is not part of
/// this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Inter-byte silence (ms) after which a partial frame is abandoned
    pub timeout_ms: u32,
    /// Treat a START byte inside a frame as the start of a new frame.
    ///
    /// Off by default: peers expect a mid-frame 0x3A to be payload.
    pub resync_on_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            resync_on_start: false,
        }
    }
}

impl EngineConfig {
    /// Set the partial-frame timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Enable or disable mid-frame START resynchronization
    pub fn with_resync_on_start(mut self, enabled: bool) -> Self {
        self.resync_on_start = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.timeout_ms, 100);
        assert!(!config.resync_on_start);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_timeout_ms(250)
            .with_resync_on_start(true);
        assert_eq!(config.timeout_ms, 250);
        assert!(config.resync_on_start);
    }
}
