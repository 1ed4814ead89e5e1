//! How logical panel LEDs are connected to the board's output lines.

use std::fmt;

use serde::Deserialize;

use crate::input::InputFlags;

/// Panel wiring, configured as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "i64")]
pub enum WiringMode {
    /// No LEDs connected; the controller stays idle
    #[default]
    None,
    /// Start, joystick and buttons 1-4 of each player on spare inputs
    Hybrid,
    /// Every LED on its own output line
    Dedicated,
    /// As `Dedicated`, on a panel with six buttons per player
    Dedicated6Buttons,
}

impl From<i64> for WiringMode {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::Hybrid,
            2 => Self::Dedicated,
            3 => Self::Dedicated6Buttons,
            _ => Self::None,
        }
    }
}

impl From<WiringMode> for i64 {
    fn from(mode: WiringMode) -> Self {
        match mode {
            WiringMode::None => 0,
            WiringMode::Hybrid => 1,
            WiringMode::Dedicated => 2,
            WiringMode::Dedicated6Buttons => 3,
        }
    }
}

impl fmt::Display for WiringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Hybrid => "hybrid",
            Self::Dedicated => "dedicated",
            Self::Dedicated6Buttons => "dedicated (6 buttons)",
        };
        f.write_str(name)
    }
}

/// Hybrid wiring: (LED, output line).
const HYBRID_LINES: [(u32, InputFlags); 12] = [
    (0, InputFlags::D6),
    (2, InputFlags::D7),
    (3, InputFlags::D8),
    (4, InputFlags::D9),
    (5, InputFlags::D10),
    (6, InputFlags::D11),
    (14, InputFlags::D18),
    (16, InputFlags::D19),
    (17, InputFlags::D20),
    (18, InputFlags::D21),
    (19, InputFlags::D22),
    (20, InputFlags::D23),
];

impl WiringMode {
    pub fn is_enabled(self) -> bool {
        self != Self::None
    }

    /// Panels with six buttons per player use their own curtain.
    pub fn six_buttons(self) -> bool {
        self == Self::Dedicated6Buttons
    }

    /// Output bit driven by `led`, if that LED is wired.
    pub fn output_bit(self, led: u32) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Hybrid => HYBRID_LINES
                .iter()
                .find(|(l, _)| *l == led)
                .and_then(|(_, line)| line.position()),
            Self::Dedicated | Self::Dedicated6Buttons => match led {
                0..=13 => Some(led),
                14..=27 => Some(led + 2),
                28 | 29 => Some(led - 14),
                30 | 31 => Some(led),
                _ => None,
            },
        }
    }

    /// Output word for the given lit LEDs (bit `n` = LED `n`).
    pub fn output_word(self, lit: u32) -> u32 {
        (0..32)
            .filter(|led| lit & (1 << led) != 0)
            .filter_map(|led| self.output_bit(led))
            .fold(0, |word, bit| word | 1 << bit)
    }
}
