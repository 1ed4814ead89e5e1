//! Input snapshot codec.
//!
//! A snapshot is the 28-byte `smart_input` record the driver fills on every
//! `SmartGetAll`: one 32-bit word of one-bit input lines followed by four
//! encoder counters and eight analog readings, all little-endian. This
//! module packs and unpacks that record explicitly instead of relying on the
//! C compiler's bit-field rules.

use bitflags::bitflags;
use smartapi_sys::smart_input;

use crate::error::{Result, SmartAsdError};

bitflags! {
    /// The 32 one-bit input lines, at their positions in the packed word.
    ///
    /// `E<n>A`/`E<n>B` are the two phase lines of encoder `n`; `D1`..`D24`
    /// are the digital inputs. Output words use the same positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputFlags: u32 {
        const E1A = 1 << 0;
        const E1B = 1 << 1;
        const E2A = 1 << 2;
        const E2B = 1 << 3;
        const D1 = 1 << 4;
        const D2 = 1 << 5;
        const D3 = 1 << 6;
        const D4 = 1 << 7;
        const D5 = 1 << 8;
        const D6 = 1 << 9;
        const D7 = 1 << 10;
        const D8 = 1 << 11;
        const D9 = 1 << 12;
        const D10 = 1 << 13;
        const D11 = 1 << 14;
        const D12 = 1 << 15;
        const E3A = 1 << 16;
        const E3B = 1 << 17;
        const E4A = 1 << 18;
        const E4B = 1 << 19;
        const D13 = 1 << 20;
        const D14 = 1 << 21;
        const D15 = 1 << 22;
        const D16 = 1 << 23;
        const D17 = 1 << 24;
        const D18 = 1 << 25;
        const D19 = 1 << 26;
        const D20 = 1 << 27;
        const D21 = 1 << 28;
        const D22 = 1 << 29;
        const D23 = 1 << 30;
        const D24 = 1 << 31;
    }
}

/// Phase line of a quadrature encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    A,
    B,
}

impl InputFlags {
    /// Number of digital input lines.
    pub const DIGITAL_LINES: u8 = 24;

    /// Digital line `line` (1..=24).
    pub fn digital(line: u8) -> Option<Self> {
        let bit = match line {
            1..=12 => line as u32 + 3,
            13..=24 => line as u32 + 7,
            _ => return None,
        };
        Some(Self::from_bits_retain(1 << bit))
    }

    /// Phase line of encoder `encoder` (1..=4).
    pub fn encoder_phase(encoder: u8, phase: Phase) -> Option<Self> {
        let base = match encoder {
            1 | 2 => (encoder as u32 - 1) * 2,
            3 | 4 => 16 + (encoder as u32 - 3) * 2,
            _ => return None,
        };
        let bit = match phase {
            Phase::A => base,
            Phase::B => base + 1,
        };
        Some(Self::from_bits_retain(1 << bit))
    }

    /// Look a line up by its header name (`"d7"`, `"e1a"`, case-insensitive).
    pub fn line(name: &str) -> Option<Self> {
        Self::from_name(&name.trim().to_ascii_uppercase())
    }

    /// Bit position of a single line, `None` for empty or combined sets.
    pub fn position(self) -> Option<u32> {
        (self.bits().count_ones() == 1).then(|| self.bits().trailing_zeros())
    }
}

/// One point-in-time read of every input on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    flags: InputFlags,
    encoders: [i16; InputSnapshot::ENCODERS],
    analog: [i16; InputSnapshot::ANALOG_CHANNELS],
}

impl InputSnapshot {
    /// Number of encoder counters.
    pub const ENCODERS: usize = 4;
    /// Number of analog channels.
    pub const ANALOG_CHANNELS: usize = 8;
    /// Encoded size in bytes.
    pub const SIZE: usize = smartapi_sys::SMART_INPUT_SIZE;

    const ENCODER_OFFSET: usize = 4;
    const ANALOG_OFFSET: usize = Self::ENCODER_OFFSET + 2 * Self::ENCODERS;

    pub fn new(
        flags: InputFlags,
        encoders: [i16; Self::ENCODERS],
        analog: [i16; Self::ANALOG_CHANNELS],
    ) -> Self {
        Self {
            flags,
            encoders,
            analog,
        }
    }

    /// All one-bit lines.
    pub fn flags(&self) -> InputFlags {
        self.flags
    }

    /// Whether every line in `flags` is set.
    pub fn is_set(&self, flags: InputFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Set or clear lines.
    pub fn set(&mut self, flags: InputFlags, value: bool) {
        self.flags.set(flags, value);
    }

    /// State of digital line `line` (1..=24).
    pub fn digital(&self, line: u8) -> Option<bool> {
        InputFlags::digital(line).map(|flag| self.flags.contains(flag))
    }

    /// State of an encoder phase line.
    pub fn encoder_phase(&self, encoder: u8, phase: Phase) -> Option<bool> {
        InputFlags::encoder_phase(encoder, phase).map(|flag| self.flags.contains(flag))
    }

    /// Encoder counter `n` (1..=4).
    pub fn encoder(&self, n: u8) -> Option<i16> {
        (n as usize).checked_sub(1).and_then(|i| self.encoders.get(i)).copied()
    }

    /// Analog channel `n` (1..=8).
    pub fn analog(&self, n: u8) -> Option<i16> {
        (n as usize).checked_sub(1).and_then(|i| self.analog.get(i)).copied()
    }

    pub fn encoders(&self) -> &[i16; Self::ENCODERS] {
        &self.encoders
    }

    pub fn encoders_mut(&mut self) -> &mut [i16; Self::ENCODERS] {
        &mut self.encoders
    }

    pub fn analog_channels(&self) -> &[i16; Self::ANALOG_CHANNELS] {
        &self.analog
    }

    pub fn analog_channels_mut(&mut self) -> &mut [i16; Self::ANALOG_CHANNELS] {
        &mut self.analog
    }

    /// Pack into the driver's byte layout.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..4].copy_from_slice(&self.flags.bits().to_le_bytes());
        for (i, value) in self.encoders.iter().enumerate() {
            let at = Self::ENCODER_OFFSET + 2 * i;
            bytes[at..at + 2].copy_from_slice(&value.to_le_bytes());
        }
        for (i, value) in self.analog.iter().enumerate() {
            let at = Self::ANALOG_OFFSET + 2 * i;
            bytes[at..at + 2].copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Unpack from the driver's byte layout.
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let word = |at: usize| i16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let flags = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Self {
            flags: InputFlags::from_bits_retain(flags),
            encoders: std::array::from_fn(|i| word(Self::ENCODER_OFFSET + 2 * i)),
            analog: std::array::from_fn(|i| word(Self::ANALOG_OFFSET + 2 * i)),
        }
    }

    /// Unpack from a slice that must be exactly [`Self::SIZE`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; Self::SIZE] =
            bytes
                .try_into()
                .map_err(|_| SmartAsdError::InvalidArgument {
                    message: format!(
                        "input snapshot must be {} bytes, got {}",
                        Self::SIZE,
                        bytes.len()
                    ),
                })?;
        Ok(Self::from_bytes(bytes))
    }
}

impl From<smart_input> for InputSnapshot {
    fn from(raw: smart_input) -> Self {
        Self {
            flags: InputFlags::from_bits_retain(raw.bits),
            encoders: [raw.enc1, raw.enc2, raw.enc3, raw.enc4],
            analog: [
                raw.a1, raw.a2, raw.a3, raw.a4, raw.a5, raw.a6, raw.a7, raw.a8,
            ],
        }
    }
}

impl From<InputSnapshot> for smart_input {
    fn from(snapshot: InputSnapshot) -> Self {
        let [enc1, enc2, enc3, enc4] = snapshot.encoders;
        let [a1, a2, a3, a4, a5, a6, a7, a8] = snapshot.analog;
        smart_input {
            bits: snapshot.flags.bits(),
            enc1,
            enc2,
            enc3,
            enc4,
            a1,
            a2,
            a3,
            a4,
            a5,
            a6,
            a7,
            a8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_positions() {
        assert_eq!(InputFlags::E1A.bits(), 1);
        assert_eq!(InputFlags::D1.position(), Some(4));
        assert_eq!(InputFlags::D12.position(), Some(15));
        assert_eq!(InputFlags::E3A.position(), Some(16));
        assert_eq!(InputFlags::D13.position(), Some(20));
        assert_eq!(InputFlags::D24.bits(), 0x8000_0000);
        assert_eq!(InputFlags::all().bits(), u32::MAX);
    }

    #[test]
    fn test_digital_lines_cover_24_bits() {
        let all = (1..=InputFlags::DIGITAL_LINES)
            .filter_map(InputFlags::digital)
            .fold(InputFlags::empty(), |acc, f| acc | f);
        assert_eq!(all.bits().count_ones(), 24);
        assert_eq!(InputFlags::digital(6), Some(InputFlags::D6));
        assert_eq!(InputFlags::digital(18), Some(InputFlags::D18));
        assert_eq!(InputFlags::digital(0), None);
        assert_eq!(InputFlags::digital(25), None);
    }

    #[test]
    fn test_encoder_phases() {
        assert_eq!(InputFlags::encoder_phase(1, Phase::B), Some(InputFlags::E1B));
        assert_eq!(InputFlags::encoder_phase(3, Phase::A), Some(InputFlags::E3A));
        assert_eq!(InputFlags::encoder_phase(4, Phase::B), Some(InputFlags::E4B));
        assert_eq!(InputFlags::encoder_phase(5, Phase::A), None);
    }

    #[test]
    fn test_line_lookup() {
        assert_eq!(InputFlags::line("d7"), Some(InputFlags::D7));
        assert_eq!(InputFlags::line("E2B"), Some(InputFlags::E2B));
        assert_eq!(InputFlags::line("d25"), None);
        assert_eq!((InputFlags::D1 | InputFlags::D2).position(), None);
    }

    #[test]
    fn test_byte_layout() {
        let mut snapshot = InputSnapshot::default();
        snapshot.set(InputFlags::E1A | InputFlags::D24, true);
        snapshot.encoders_mut()[0] = -2;
        snapshot.analog_channels_mut()[7] = 0x1234;

        let bytes = snapshot.to_bytes();
        assert_eq!(&bytes[0..4], &[0x01, 0x00, 0x00, 0x80]);
        assert_eq!(&bytes[4..6], &[0xfe, 0xff]);
        assert_eq!(&bytes[26..28], &[0x34, 0x12]);
        assert_eq!(InputSnapshot::from_bytes(&bytes), snapshot);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_bytes_match_native_struct() {
        let mut snapshot = InputSnapshot::default();
        snapshot.set(InputFlags::D3 | InputFlags::E4A, true);
        *snapshot.encoders_mut() = [1, -1, 300, i16::MIN];
        *snapshot.analog_channels_mut() = [0, 1, 2, 3, 4, 5, 6, i16::MAX];

        let raw: smart_input = snapshot.into();
        // SAFETY: smart_input is repr(C), 28 bytes, without padding
        let native: [u8; InputSnapshot::SIZE] = unsafe { std::mem::transmute(raw) };
        assert_eq!(native, snapshot.to_bytes());
        assert_eq!(InputSnapshot::from(raw), snapshot);
    }

    #[test]
    fn test_accessors() {
        let snapshot = InputSnapshot::new(
            InputFlags::D2 | InputFlags::E2A,
            [10, 20, 30, 40],
            [1, 2, 3, 4, 5, 6, 7, 8],
        );
        assert_eq!(snapshot.digital(2), Some(true));
        assert_eq!(snapshot.digital(3), Some(false));
        assert_eq!(snapshot.encoder_phase(2, Phase::A), Some(true));
        assert_eq!(snapshot.encoder(4), Some(40));
        assert_eq!(snapshot.encoder(0), None);
        assert_eq!(snapshot.analog(8), Some(8));
        assert_eq!(snapshot.analog(9), None);
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        let err = InputSnapshot::from_slice(&[0u8; 27]).unwrap_err();
        assert!(err.to_string().contains("28"));
        assert!(InputSnapshot::from_slice(&[0u8; 28]).is_ok());
    }
}
