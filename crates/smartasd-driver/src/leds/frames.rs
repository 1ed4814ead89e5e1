//! Transition programs and their frame tables.
//!
//! A frame is a 32-bit word ANDed with the LED state; bit `n` is logical
//! LED `n`. Tables are built at compile time.

use std::fmt;

/// A canned animation played over the LED state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionProgram {
    /// No animation; blink timers drive the LEDs
    #[default]
    None,
    /// Both players light up from the start button outwards
    WakeUp,
    /// Wake-up with each 16-bit half mirrored
    ReverseWakeUp,
    /// Single lights running across both players
    Chase,
    /// Panel closes towards the centre and opens again
    Curtain,
}

impl fmt::Display for TransitionProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::WakeUp => "wake-up",
            Self::ReverseWakeUp => "reverse wake-up",
            Self::Chase => "chase",
            Self::Curtain => "curtain",
        };
        f.write_str(name)
    }
}

/// Frame table of the `None` program.
pub const NONE_FRAMES: [u32; 1] = [u32::MAX];

pub const WAKE_UP_FRAMES: [u32; 17] = wake_up();

pub const REVERSE_WAKE_UP_FRAMES: [u32; 17] = reverse_wake_up();

pub const CHASE_FRAMES: [u32; 26] = chase();

#[rustfmt::skip]
pub const CURTAIN_FRAMES: [u32; 38] = [
    0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF,
    0x9FFF_FFFF, 0x9FFF_FFFF,
    0x0FFF_FFFF, 0x0FFF_FFFF,
    0x0FFE_E7FF, 0x0FFE_E7FF,
    0x0FDC_E3BF, 0x0FDC_E3BF,
    0x0F98_A19D, 0x0F98_A19D,
    0x0F10_208C, 0x0F10_208C,
    0x0E00_2004, 0x0E00_2004,
    0x0800_2000, 0x0800_2000,
    0x0000_0000, 0x0000_0000, 0x0000_0000, 0x0000_0000,
    0x0800_2000, 0x0800_2000,
    0x0E00_2004, 0x0E00_2004,
    0x0F10_208C, 0x0F10_208C,
    0x0F98_A19D, 0x0F98_A19D,
    0x0FDC_E3BF, 0x0FDC_E3BF,
    0x9FFE_E7FF, 0x9FFE_E7FF,
    0xFFFF_FFFF, 0xFFFF_FFFF,
];

/// Curtain for panels with six buttons per player; buttons 4 and 8 of each
/// player are never lit.
#[rustfmt::skip]
pub const CURTAIN_FRAMES_SIX_BUTTONS: [u32; 32] = [
    0xFEEF_FBBF, 0xFEEF_FBBF, 0xFEEF_FBBF, 0xFEEF_FBBF,
    0x9EEE_E3BF, 0x9EEE_E3BF,
    0x0ECC_A19D, 0x0ECC_A19D,
    0x0E88_208C, 0x0E88_208C,
    0x0E00_2004, 0x0E00_2004,
    0x0800_2000, 0x0800_2000,
    0x0000_0000, 0x0000_0000, 0x0000_0000, 0x0000_0000,
    0x0800_2000, 0x0800_2000,
    0x0E00_2004, 0x0E00_2004,
    0x0E88_208C, 0x0E88_208C,
    0x0ECC_A19D, 0x0ECC_A19D,
    0x9EEE_E3BF, 0x9EEE_E3BF,
    0xFEEF_FBBF, 0xFEEF_FBBF, 0xFEEF_FBBF, 0xFEEF_FBBF,
];

/// LEDs per player row used by the animations.
const ROW: u32 = 14;

const fn wake_up() -> [u32; 17] {
    let mut frames = [0u32; 17];
    let mut frame = 0;
    while frame < ROW as usize {
        // LEDs 0..=frame of both players
        let lit = (1u32 << (frame + 1)) - 1;
        frames[frame] = lit | (lit << ROW);
        frame += 1;
    }
    while frame < 17 {
        // then the extra buttons, one per frame
        frames[frame] = u32::MAX >> (31 - (frame + 14));
        frame += 1;
    }
    frames
}

const fn mirror_halves(word: u32) -> u32 {
    let low = (word as u16).reverse_bits() as u32;
    let high = ((word >> 16) as u16).reverse_bits() as u32;
    low | (high << 16)
}

const fn reverse_wake_up() -> [u32; 17] {
    let wake = wake_up();
    let mut frames = [0u32; 17];
    let mut frame = 0;
    while frame < 17 {
        frames[frame] = mirror_halves(wake[frame]);
        frame += 1;
    }
    frames
}

/// Player 1's light walks up while player 2's walks down, then back.
///
/// Player 1 positions are shifted down by one, so LED 0 wraps to bit 31.
const fn chase() -> [u32; 26] {
    let mut frames = [0u32; 26];
    let mut frame: u32 = 0;
    while frame < 26 {
        let (up, down) = if frame < ROW {
            (frame, ROW - frame)
        } else {
            (ROW - (frame - ROW), frame - ROW)
        };
        let mut word = 0;
        if up < ROW {
            word |= 1u32.wrapping_shl(up.wrapping_sub(1));
        }
        if down < ROW {
            word |= 1u32 << (down + 13);
        }
        frames[frame as usize] = word;
        frame += 1;
    }
    frames
}

impl TransitionProgram {
    /// Frame table of this program; `six_buttons` selects the curtain variant.
    pub fn frames(self, six_buttons: bool) -> &'static [u32] {
        match self {
            Self::None => &NONE_FRAMES,
            Self::WakeUp => &WAKE_UP_FRAMES,
            Self::ReverseWakeUp => &REVERSE_WAKE_UP_FRAMES,
            Self::Chase => &CHASE_FRAMES,
            Self::Curtain if six_buttons => &CURTAIN_FRAMES_SIX_BUTTONS,
            Self::Curtain => &CURTAIN_FRAMES,
        }
    }
}
