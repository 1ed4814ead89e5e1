//! LED controller against the simulated driver.
//!
//! Time is passed in explicitly, so these tests step a millisecond clock
//! instead of sleeping.

use std::sync::Arc;
use std::time::Duration;

use smartasd_driver::leds::frames::CURTAIN_FRAMES;
use smartasd_driver::leds::{LedController, Scene, TransitionProgram, WiringMode};
use smartasd_driver::{InputFlags, Operation, SimulatedDriver, SmartAsdConfig};

const RETRY_MS: u64 = 5000;

fn controller(sim: &Arc<SimulatedDriver>, wiring: WiringMode) -> LedController {
    LedController::new(sim.clone(), "*", wiring).with_attach_retry(Duration::from_millis(RETRY_MS))
}

#[test]
fn test_attach_retry_cycle() {
    let sim = Arc::new(SimulatedDriver::new());
    let mut leds = controller(&sim, WiringMode::Dedicated);
    leds.panel_mut().reset(true);

    // first update scans straight away
    leds.update(10);
    assert!(!leds.is_attached());
    assert_eq!(sim.call_count(Operation::Scan), 1);

    // no rescans inside the retry interval
    leds.update(2000);
    leds.update(10 + RETRY_MS);
    assert_eq!(sim.call_count(Operation::Scan), 1);

    // a board appears; picked up on the next retry
    let id = sim.add_board("panel");
    leds.update(11 + RETRY_MS);
    assert!(leds.is_attached());
    assert_eq!(sim.call_count(Operation::Scan), 2);
    assert_eq!(sim.outputs(id), Some(u32::MAX));
}

#[test]
fn test_failed_write_detaches_and_reattaches() {
    let sim = Arc::new(SimulatedDriver::with_boards(["panel"]));
    let mut leds = controller(&sim, WiringMode::Dedicated);

    leds.panel_mut().reset(true);
    leds.update(1);
    assert!(leds.is_attached());

    sim.fail_next(Operation::SetAll, 9);
    leds.panel_mut().reset(false);
    leds.update(2);
    assert!(!leds.is_attached());

    // the same word is written again once the board is back
    leds.update(3 + RETRY_MS);
    assert!(leds.is_attached());
    let id = leds.device().map(|d| d.id()).unwrap();
    assert_eq!(sim.outputs(id), Some(0));
    assert_eq!(sim.open_count(id), 2);
}

#[test]
fn test_named_device_only() {
    let sim = Arc::new(SimulatedDriver::with_boards(["left", "right"]));
    let mut leds = LedController::new(sim.clone(), "right", WiringMode::Hybrid);
    leds.update(1);
    assert_eq!(leds.device().map(|d| d.name().to_string()), Some("right".to_string()));
}

#[test]
fn test_hybrid_output_lines() {
    let sim = Arc::new(SimulatedDriver::with_boards(["panel"]));
    let id = sim.add_board("second");
    let mut leds = LedController::new(sim.clone(), "second", WiringMode::Hybrid);

    leds.panel_mut().show_controls("joy8way - 2P - 1Bt", false, true);
    leds.update(1);

    let expected = InputFlags::D6
        | InputFlags::D7
        | InputFlags::D8
        | InputFlags::D18
        | InputFlags::D19
        | InputFlags::D20;
    assert_eq!(sim.outputs(id), Some(expected.bits()));
}

#[test]
fn test_shutdown_and_release() {
    let sim = Arc::new(SimulatedDriver::with_boards(["panel"]));
    let mut leds = controller(&sim, WiringMode::Dedicated);
    leds.panel_mut().reset(true);
    leds.update(1);
    let id = leds.device().map(|d| d.id()).unwrap();

    leds.release();
    assert!(!sim.is_open(id));
    assert_eq!(sim.outputs(id), Some(u32::MAX));

    leds.update(2 + RETRY_MS);
    assert!(sim.is_open(id));

    leds.shutdown();
    assert!(!sim.is_open(id));
    assert_eq!(sim.outputs(id), Some(0));
}

#[test]
fn test_curtain_plays_through_device() {
    let sim = Arc::new(SimulatedDriver::with_boards(["panel"]));
    let mut leds = controller(&sim, WiringMode::Dedicated6Buttons);
    leds.panel_mut().curtain();

    let mut now = 0;
    let mut dark_frame_seen = false;
    while leds.panel().transition() == TransitionProgram::Curtain {
        now += 21;
        if leds.update(now) == Some(0) {
            dark_frame_seen = true;
        }
        assert!(now < 10_000, "curtain never finished");
    }
    assert!(dark_frame_seen);
    assert_eq!(leds.panel().scene(), Scene::Idle);
}

#[test]
fn test_dedicated_curtain_frame_by_frame() {
    let sim = Arc::new(SimulatedDriver::with_boards(["panel"]));
    let mut leds = controller(&sim, WiringMode::Dedicated);
    leds.panel_mut().curtain();

    let wiring = WiringMode::Dedicated;
    assert_eq!(leds.update(0), Some(wiring.output_word(CURTAIN_FRAMES[0])));
    let id = leds.device().map(|d| d.id()).unwrap();

    // very fast frames last 20 ms; each step lands past the next deadline
    let mut now = 0;
    for (index, frame) in CURTAIN_FRAMES.iter().enumerate().skip(1) {
        now += 21;
        let word = wiring.output_word(*frame);
        assert_eq!(leds.update(now), Some(word), "frame {}", index);
        assert_eq!(leds.panel().frame(), index);
        assert_eq!(sim.outputs(id), Some(word), "frame {}", index);
    }
    assert_eq!(leds.panel().transition(), TransitionProgram::Curtain);

    now += 21;
    assert_eq!(leds.update(now), Some(wiring.output_word(u32::MAX)));
    assert_eq!(leds.panel().transition(), TransitionProgram::None);
    assert_eq!(leds.panel().scene(), Scene::Idle);
}

#[test]
fn test_from_config() {
    let config = SmartAsdConfig::from_toml_str(
        r#"
        [device]
        name = "cabinet"
        wiring_mode = 0
        "#,
    )
    .unwrap();
    let sim = Arc::new(SimulatedDriver::with_boards(["cabinet"]));
    let mut leds = LedController::from_config(sim.clone(), &config);
    assert_eq!(leds.wiring(), WiringMode::None);
    assert_eq!(leds.update(1), None);
    assert!(!leds.is_attached());
}
