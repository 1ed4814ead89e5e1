//! Masked output writes.

use crate::error::{Result, SmartAsdError};

/// Number of output channels, one per bit of the output word.
pub const OUTPUT_CHANNELS: u32 = 32;

/// Mask selecting every output channel.
pub const ALL_CHANNELS: u32 = u32::MAX;

/// A write to the output word: bits of `state` selected by `mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputWrite {
    pub state: u32,
    pub mask: u32,
}

impl OutputWrite {
    pub const fn new(state: u32, mask: u32) -> Self {
        Self { state, mask }
    }

    /// Replace the whole output word.
    pub const fn all(state: u32) -> Self {
        Self::new(state, ALL_CHANNELS)
    }

    /// Switch one channel, leaving the others alone.
    pub fn channel(channel: u32, on: bool) -> Result<Self> {
        let mask = channel_mask(channel)?;
        Ok(Self::new(if on { mask } else { 0 }, mask))
    }

    /// The output word after applying this write to `current`.
    pub const fn apply(self, current: u32) -> u32 {
        (current & !self.mask) | (self.state & self.mask)
    }
}

/// Bit mask for output channel `channel` (0..=31).
pub fn channel_mask(channel: u32) -> Result<u32> {
    if channel >= OUTPUT_CHANNELS {
        return Err(SmartAsdError::InvalidChannel {
            channel,
            max: OUTPUT_CHANNELS,
        });
    }
    Ok(1 << channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_mask_is_noop() {
        for current in [0, 1, 0xdead_beef, u32::MAX] {
            for state in [0, 0x5555_5555, u32::MAX] {
                assert_eq!(OutputWrite::new(state, 0).apply(current), current);
            }
        }
    }

    #[test]
    fn test_full_mask_replaces_word() {
        assert_eq!(OutputWrite::all(0x0f0f_0f0f).apply(0xffff_0000), 0x0f0f_0f0f);
    }

    #[test]
    fn test_partial_mask() {
        let write = OutputWrite::new(0b1010, 0b0110);
        assert_eq!(write.apply(0b0001), 0b0011);
    }

    #[test]
    fn test_channel_write() {
        let on = OutputWrite::channel(31, true).unwrap();
        assert_eq!(on.apply(0), 0x8000_0000);
        let off = OutputWrite::channel(0, false).unwrap();
        assert_eq!(off.apply(0b11), 0b10);
        assert!(OutputWrite::channel(32, true).is_err());
    }
}
