//! LED state machine of a two-player control panel.
//!
//! [`LedPanel`] knows nothing about the board. It is driven by a monotonic
//! millisecond clock through [`LedPanel::tick`], which returns the LEDs that
//! are lit at that instant; the controller maps them to output lines.

use std::time::Duration;

use tracing::debug;

use super::frames::TransitionProgram;
use super::layout::{led_by_name, ControlLayout, LED_COUNT};

/// Blink cadence of a single LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlinkStyle {
    /// Steady
    #[default]
    None,
    Slow,
    Fast,
    VeryFast,
}

impl BlinkStyle {
    /// Time between two toggles, `None` for steady LEDs.
    pub fn period(self) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Slow => Some(Duration::from_millis(800)),
            Self::Fast => Some(Duration::from_millis(300)),
            Self::VeryFast => Some(Duration::from_millis(150)),
        }
    }
}

/// Frame duration of a transition program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRate {
    Slow,
    Fast,
    VeryFast,
}

impl FrameRate {
    pub fn frame_duration(self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(400),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(20),
        }
    }
}

/// Which panel program is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scene {
    #[default]
    Idle,
    /// Game list controls highlighted
    List,
    /// Menu controls highlighted
    Menu,
    /// Controls of the selected game
    Controls,
    /// Repeating chase
    Attract,
    /// One-shot curtain, back to `Idle` when it ends
    Curtain,
}

/// Blink timer of one style.
#[derive(Debug, Clone, Copy, Default)]
struct BlinkTimer {
    deadline: u64,
}

impl BlinkTimer {
    fn rearm(&mut self, now: u64, period: Duration) {
        self.deadline = now.saturating_add(millis(period));
    }

    /// Whether the timer fired; re-arms it if so.
    fn fire(&mut self, now: u64, period: Duration) -> bool {
        if now > self.deadline {
            self.rearm(now, period);
            true
        } else {
            false
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Styles that toggle, with their timer index.
const BLINKING: [BlinkStyle; 3] = [BlinkStyle::Slow, BlinkStyle::Fast, BlinkStyle::VeryFast];

/// LED state of the whole panel.
#[derive(Debug, Clone)]
pub struct LedPanel {
    /// LEDs switched on (bit `n` = LED `n`)
    status: u32,
    /// Blink phase; a set bit lets the LED show
    blink: u32,
    styles: [BlinkStyle; LED_COUNT as usize],
    timers: [BlinkTimer; BLINKING.len()],

    transition: TransitionProgram,
    repeat: bool,
    frame: usize,
    frame_duration: Duration,
    frame_deadline: u64,
    six_buttons: bool,

    scene: Scene,
    /// Control string of the last `show_controls`
    shown_controls: String,
}

impl LedPanel {
    /// All LEDs off, no transition. `six_buttons` selects the curtain table.
    pub fn new(six_buttons: bool) -> Self {
        let mut panel = Self {
            status: 0,
            blink: 0,
            styles: [BlinkStyle::None; LED_COUNT as usize],
            timers: [BlinkTimer::default(); BLINKING.len()],
            transition: TransitionProgram::None,
            repeat: false,
            frame: 0,
            frame_duration: FrameRate::Fast.frame_duration(),
            frame_deadline: 0,
            six_buttons,
            scene: Scene::Idle,
            shown_controls: String::new(),
        };
        panel.reset(false);
        panel
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn transition(&self) -> TransitionProgram {
        self.transition
    }

    /// Index of the frame being shown.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// LEDs switched on, ignoring blink and transitions.
    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn blink_style(&self, led: u32) -> BlinkStyle {
        self.styles
            .get(led as usize)
            .copied()
            .unwrap_or(BlinkStyle::None)
    }

    /// Switch `led` on or off with a blink style. Out-of-range LEDs are ignored.
    pub fn set_led(&mut self, led: u32, on: bool, blink: BlinkStyle) {
        let Some(style) = self.styles.get_mut(led as usize) else {
            return;
        };
        let mask = 1u32 << led;
        if on {
            self.status |= mask;
        } else {
            self.status &= !mask;
        }
        self.blink |= mask;
        *style = blink;
    }

    /// Switch every LED on or off and stop all blinking.
    pub fn reset(&mut self, on: bool) {
        for led in 0..LED_COUNT {
            self.set_led(led, on, BlinkStyle::None);
        }
    }

    /// Play `program` from its first frame.
    ///
    /// Restarting the repeating program already running only updates the
    /// frame duration.
    pub fn start_transition(&mut self, program: TransitionProgram, repeat: bool, rate: FrameRate) {
        if program != self.transition || !repeat {
            self.transition = program;
            self.frame = 0;
            self.repeat = repeat;
        }
        self.frame_duration = rate.frame_duration();
    }

    /// Light the controls of a game described by `input_controls`
    /// (`"joy4way - 2P - 6Bt"`).
    ///
    /// Unless `immediate`, the LEDs blink fast and a reverse wake-up plays.
    /// Showing the same string twice is a no-op unless `reset` is set.
    pub fn show_controls(&mut self, input_controls: &str, reset: bool, immediate: bool) {
        if reset {
            self.shown_controls.clear();
        }
        if self.scene == Scene::Controls && self.shown_controls == input_controls {
            return;
        }
        self.scene = Scene::Controls;
        self.shown_controls = input_controls.to_string();

        let layout = ControlLayout::parse(input_controls);
        debug!(input_controls, ?layout, immediate, "Showing game controls");

        self.reset(false);
        let blink = if immediate {
            BlinkStyle::None
        } else {
            BlinkStyle::Fast
        };
        for led in layout.leds() {
            self.set_led(led, true, blink);
        }
        if !immediate {
            self.start_transition(TransitionProgram::ReverseWakeUp, false, FrameRate::Fast);
        }
    }

    /// Light every LED and fast-blink the ones named in `controls`
    /// (`"start1|joy1|bt1-1"`).
    ///
    /// `scene` picks the animation: wake-up for [`Scene::List`], reverse
    /// wake-up otherwise. Nothing happens while `scene` is already showing.
    pub fn highlight(&mut self, controls: &str, scene: Scene) {
        if self.scene == scene {
            return;
        }
        let named: u32 = controls
            .split('|')
            .filter_map(|token| led_by_name(token.trim()))
            .fold(0, |mask, led| mask | 1 << led);

        for led in 0..LED_COUNT {
            let blink = if named & (1 << led) != 0 {
                BlinkStyle::Fast
            } else {
                BlinkStyle::None
            };
            self.set_led(led, true, blink);
        }

        self.shown_controls.clear();
        let program = if scene == Scene::List {
            TransitionProgram::WakeUp
        } else {
            TransitionProgram::ReverseWakeUp
        };
        self.start_transition(program, false, FrameRate::VeryFast);
        debug!(controls, ?scene, %program, "Highlighting controls");
        self.scene = scene;
    }

    /// Everything on with a slow repeating chase.
    pub fn attract(&mut self) {
        if self.scene == Scene::Attract {
            return;
        }
        self.scene = Scene::Attract;
        self.reset(true);
        self.start_transition(TransitionProgram::Chase, true, FrameRate::Slow);
    }

    /// Everything on with a one-shot curtain.
    pub fn curtain(&mut self) {
        if self.scene == Scene::Curtain {
            return;
        }
        self.scene = Scene::Curtain;
        self.reset(true);
        self.start_transition(TransitionProgram::Curtain, false, FrameRate::VeryFast);
    }

    /// Advance timers to `now` (milliseconds, monotonic) and return the LEDs
    /// lit at that instant.
    pub fn tick(&mut self, now: u64) -> u32 {
        let mut toggled = [false; BLINKING.len()];

        if self.transition != TransitionProgram::None {
            if now > self.frame_deadline {
                self.advance_frame();
                self.frame_deadline = now.saturating_add(millis(self.frame_duration));
                for (timer, style) in self.timers.iter_mut().zip(BLINKING) {
                    if let Some(period) = style.period() {
                        timer.rearm(now, period);
                    }
                }
            }
        } else {
            for ((timer, style), fired) in self.timers.iter_mut().zip(BLINKING).zip(&mut toggled) {
                if let Some(period) = style.period() {
                    *fired = timer.fire(now, period);
                }
            }
        }

        for (led, style) in self.styles.iter().enumerate() {
            let toggles = BLINKING
                .iter()
                .zip(toggled)
                .any(|(blinking, fired)| fired && blinking == style);
            if toggles {
                self.blink ^= 1 << led;
            }
        }

        if self.transition == TransitionProgram::None {
            self.status & self.blink
        } else {
            let frames = self.transition.frames(self.six_buttons);
            self.status & frames.get(self.frame).copied().unwrap_or(u32::MAX)
        }
    }

    fn advance_frame(&mut self) {
        let frames = self.transition.frames(self.six_buttons).len();
        if self.frame + 1 < frames {
            self.frame += 1;
        } else if self.repeat {
            self.frame = 0;
        } else {
            debug!(program = %self.transition, "Transition finished");
            self.transition = TransitionProgram::None;
            self.frame = 0;
            if self.scene == Scene::Curtain {
                self.scene = Scene::Idle;
            }
        }
    }
}

impl Default for LedPanel {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leds::frames::{CHASE_FRAMES, CURTAIN_FRAMES_SIX_BUTTONS, REVERSE_WAKE_UP_FRAMES};

    #[test]
    fn test_steady_led() {
        let mut panel = LedPanel::default();
        panel.set_led(3, true, BlinkStyle::None);
        for now in [0, 1, 500, 5000] {
            assert_eq!(panel.tick(now), 1 << 3);
        }
        panel.set_led(3, false, BlinkStyle::None);
        assert_eq!(panel.tick(6000), 0);
    }

    #[test]
    fn test_fast_blink_cadence() {
        let mut panel = LedPanel::default();
        panel.set_led(0, true, BlinkStyle::Fast);

        // first tick past the zero deadline toggles the LED off
        assert_eq!(panel.tick(1), 0);
        assert_eq!(panel.tick(301), 0);
        assert_eq!(panel.tick(302), 1);
        assert_eq!(panel.tick(602), 1);
        assert_eq!(panel.tick(603), 0);
    }

    #[test]
    fn test_blink_styles_are_independent() {
        let mut panel = LedPanel::default();
        panel.set_led(0, true, BlinkStyle::Slow);
        panel.set_led(1, true, BlinkStyle::VeryFast);
        assert_eq!(panel.tick(1), 0);
        // very fast came back, slow still dark
        assert_eq!(panel.tick(152), 0b10);
        assert_eq!(panel.tick(802), 0b01);
    }

    #[test]
    fn test_out_of_range_led_ignored() {
        let mut panel = LedPanel::default();
        panel.set_led(32, true, BlinkStyle::Fast);
        assert_eq!(panel.status(), 0);
        assert_eq!(panel.blink_style(40), BlinkStyle::None);
    }

    #[test]
    fn test_one_shot_transition_ends() {
        let mut panel = LedPanel::new(true);
        panel.curtain();
        assert_eq!(panel.scene(), Scene::Curtain);
        assert_eq!(panel.tick(0), CURTAIN_FRAMES_SIX_BUTTONS[0]);

        let mut now = 0;
        for frame in 1..CURTAIN_FRAMES_SIX_BUTTONS.len() {
            now += 21;
            assert_eq!(panel.tick(now), CURTAIN_FRAMES_SIX_BUTTONS[frame], "frame {}", frame);
        }
        now += 21;
        panel.tick(now);
        assert_eq!(panel.transition(), TransitionProgram::None);
        assert_eq!(panel.scene(), Scene::Idle);
        assert_eq!(panel.tick(now + 1), u32::MAX);
    }

    #[test]
    fn test_repeating_chase_wraps() {
        let mut panel = LedPanel::default();
        panel.attract();
        let mut now = 0;
        for _ in 0..CHASE_FRAMES.len() {
            now += 401;
            panel.tick(now);
        }
        assert_eq!(panel.transition(), TransitionProgram::Chase);
        assert_eq!(panel.frame(), 0);

        // restarting the running repeat keeps its position
        now += 401;
        panel.tick(now);
        panel.start_transition(TransitionProgram::Chase, true, FrameRate::Fast);
        assert_eq!(panel.frame(), 1);
    }

    #[test]
    fn test_show_controls() {
        let mut panel = LedPanel::default();
        panel.show_controls("joy4way - 1P - 2Bt", false, false);
        assert_eq!(panel.scene(), Scene::Controls);
        assert_eq!(panel.status(), 0b11111);
        assert_eq!(panel.blink_style(2), BlinkStyle::Fast);
        assert_eq!(panel.transition(), TransitionProgram::ReverseWakeUp);
        assert_eq!(panel.tick(0), 0b11111 & REVERSE_WAKE_UP_FRAMES[0]);

        // same string again: nothing restarts
        panel.tick(100);
        let frame = panel.frame();
        panel.show_controls("joy4way - 1P - 2Bt", false, false);
        assert_eq!(panel.frame(), frame);

        panel.show_controls("joy4way - 1P - 2Bt", true, true);
        assert_eq!(panel.blink_style(2), BlinkStyle::None);
    }

    #[test]
    fn test_show_controls_immediate() {
        let mut panel = LedPanel::default();
        panel.show_controls("doublejoy - 1P - 1Bt", false, true);
        assert_eq!(panel.transition(), TransitionProgram::None);
        assert_eq!(panel.tick(0), 0b1111 | 1 << 16);
    }

    #[test]
    fn test_highlight() {
        let mut panel = LedPanel::default();
        panel.highlight("start1|bt2-2|nonsense", Scene::List);
        assert_eq!(panel.status(), u32::MAX);
        assert_eq!(panel.blink_style(0), BlinkStyle::Fast);
        assert_eq!(panel.blink_style(18), BlinkStyle::Fast);
        assert_eq!(panel.blink_style(1), BlinkStyle::None);
        assert_eq!(panel.transition(), TransitionProgram::WakeUp);

        panel.highlight("start1", Scene::Menu);
        assert_eq!(panel.transition(), TransitionProgram::ReverseWakeUp);
        assert_eq!(panel.blink_style(18), BlinkStyle::None);
    }

    #[test]
    fn test_highlight_forgets_shown_controls() {
        let mut panel = LedPanel::default();
        panel.show_controls("joy - 1P", false, true);
        panel.highlight("joy1", Scene::Menu);
        panel.show_controls("joy - 1P", false, true);
        assert_eq!(panel.scene(), Scene::Controls);
    }
}
