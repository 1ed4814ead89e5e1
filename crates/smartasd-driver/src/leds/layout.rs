//! Logical LED numbering and control-string parsing.
//!
//! ```text
//!                       28  29  30  31
//!
//!          03 04 05 06                  17 18 19 20
//!                        11                           25
//! 13  02   07 08 09 10             16   21 22 23 24       27
//!                        12                           26
//!          00  01                       14  15
//! ```

/// Number of logical LEDs.
pub const LED_COUNT: u32 = 32;

/// Distance between the same LED of player 1 and player 2.
pub const PLAYER_OFFSET: u32 = 14;

/// Players with their own LED row.
pub const MAX_PLAYERS: u32 = 2;

/// Buttons per player.
pub const MAX_BUTTONS: u32 = 8;

pub const START: u32 = 0;
pub const COIN: u32 = 1;
pub const JOYSTICK: u32 = 2;
pub const FIRST_BUTTON: u32 = 3;
pub const SPINNER: u32 = 11;
pub const TRACKBALL: u32 = 12;
pub const SIDE_BUTTON: u32 = 13;
pub const FIRST_EXTRA: u32 = 28;

/// LED `led` of player `player` (0 or 1).
pub const fn player_led(player: u32, led: u32) -> u32 {
    player * PLAYER_OFFSET + led
}

/// Controls a game uses, parsed from strings like `"joy8way - 2P - 6Bt"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlLayout {
    /// Players, capped at [`MAX_PLAYERS`]
    pub players: u32,
    pub buttons: u32,
    pub joystick: bool,
    /// Two joysticks for player 1 (the second one is player 2's)
    pub double_joystick: bool,
    pub spinner: bool,
    pub trackball: bool,
}

impl ControlLayout {
    /// Parse a `-`-separated control string.
    ///
    /// Counts that do not parse are ignored, as is anything unknown.
    pub fn parse(text: &str) -> Self {
        let mut layout = Self::default();
        for token in text.split('-').map(str::trim) {
            if let Some(pos) = token.find('P') {
                if let Ok(n) = token[..pos].trim().parse() {
                    layout.players = n;
                }
            }
            if let Some(pos) = token.find("Bt") {
                if let Ok(n) = token[..pos].trim().parse() {
                    layout.buttons = n;
                }
            }
            layout.joystick |= token.contains("joy") || token.contains("stick");
            layout.double_joystick |= token.contains("doublejoy");
            layout.spinner |= token.contains("dial") || token.contains("paddle");
            layout.trackball |= token.contains("trackball");
        }
        layout.players = layout.players.min(MAX_PLAYERS);
        layout
    }

    /// LEDs lit for this layout.
    pub fn leds(&self) -> Vec<u32> {
        let mut leds = Vec::new();
        for player in 0..self.players {
            let at = |led| player_led(player, led);
            if self.joystick {
                leds.push(at(JOYSTICK));
            }
            if self.spinner {
                leds.push(at(SPINNER));
            }
            if self.trackball {
                leds.push(at(TRACKBALL));
            }
            leds.push(at(START));
            leds.push(at(COIN));
            for button in 0..self.buttons.min(MAX_BUTTONS) {
                leds.push(at(FIRST_BUTTON + button));
            }
        }
        if self.double_joystick {
            leds.push(player_led(1, JOYSTICK));
        }
        leds
    }
}

/// LED named by a highlight token (`start1`, `bt2-3`, `extra4`, ...).
pub fn led_by_name(name: &str) -> Option<u32> {
    if let Some(n) = name.strip_prefix("extra") {
        return match n.parse::<u32>() {
            Ok(n @ 1..=4) => Some(FIRST_EXTRA + n - 1),
            _ => None,
        };
    }
    if let Some(rest) = name.strip_prefix("bt") {
        let (player, button) = rest.split_once('-')?;
        let player = parse_player(player)?;
        return match button.parse::<u32>() {
            Ok(b @ 1..=MAX_BUTTONS) => Some(player_led(player, FIRST_BUTTON + b - 1)),
            _ => None,
        };
    }

    let last = name.chars().last()?;
    let control = &name[..name.len() - last.len_utf8()];
    let player = parse_player(last.encode_utf8(&mut [0; 4]))?;
    let led = match control {
        "start" => START,
        "coin" => COIN,
        "joy" => JOYSTICK,
        "dial" => SPINNER,
        "track" => TRACKBALL,
        "side" => SIDE_BUTTON,
        _ => return None,
    };
    Some(player_led(player, led))
}

fn parse_player(text: &str) -> Option<u32> {
    match text {
        "1" => Some(0),
        "2" => Some(1),
        _ => None,
    }
}
