//! End-to-end tests of the buzzer system over the simulation platform.

use buzz_common::gpio::config::{BuzzerConfig, LineConfig, ResetConfig, SystemConfig};
use buzz_common::gpio::platform::Platform;
use buzz_common::gpio::types::{Edge, LineId};
use buzz_hal::core::BuzzerSystem;
use buzz_hal::drivers::simulation::{SimFault, SimulationPlatform};
use buzz_hal::error::{SystemError, UnitId};
use buzz_hal::latch::LatchState;
use buzz_hal::platform_registry::PlatformRegistry;
use proptest::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

const BTN1: LineId = LineId(27);
const BTN2: LineId = LineId(23);
const LED1: LineId = LineId(24);
const LED2: LineId = LineId(25);
const RESET: LineId = LineId(26);

fn stock_system() -> (Arc<SimulationPlatform>, BuzzerSystem) {
    system_with(SystemConfig::default())
}

fn system_with(config: SystemConfig) -> (Arc<SimulationPlatform>, BuzzerSystem) {
    let sim = Arc::new(SimulationPlatform::new());
    let platform: Arc<dyn Platform> = sim.clone();
    let system = BuzzerSystem::new(config, platform).expect("valid config");
    (sim, system)
}

/// `count` buzzers on buttons 0.. and LEDs 20.., reset on 40.
fn panel(count: u32) -> SystemConfig {
    SystemConfig {
        buzzers: (0..count)
            .map(|i| BuzzerConfig {
                button: LineConfig::new(i, format!("button {}", i + 1)),
                led: LineConfig::new(20 + i, format!("led {}", i + 1)),
            })
            .collect(),
        reset: ResetConfig {
            button: LineConfig::new(40, "reset button"),
        },
        ..SystemConfig::default()
    }
}

#[test]
fn scenario_a_first_press_wins_until_reset() {
    let (sim, mut system) = stock_system();
    system.init().expect("init");

    sim.press(BTN1);
    assert_eq!(sim.level(LED1), Some(true));
    assert_eq!(sim.level(LED2), Some(false));
    assert_eq!(system.winner(), Some(0));

    sim.press(BTN2);
    assert_eq!(sim.level(LED1), Some(true));
    assert_eq!(sim.level(LED2), Some(false));

    sim.press(RESET);
    assert_eq!(sim.level(LED1), Some(false));
    assert_eq!(system.latch().state(), LatchState::Idle);

    sim.press(BTN2);
    assert_eq!(sim.level(LED1), Some(false));
    assert_eq!(sim.level(LED2), Some(true));
    assert_eq!(system.winner(), Some(1));
}

#[test]
fn scenario_b_second_buzzer_configuration_failure() {
    let (sim, mut system) = stock_system();
    sim.inject_fault(LED2, SimFault::Direction);

    let err = system.init().unwrap_err();
    assert!(matches!(
        err,
        SystemError::Unit {
            unit: UnitId::Buzzer(1),
            ..
        }
    ));
    assert_eq!(err.code(), -libc::EIO);

    for line in [BTN1, LED1, BTN2, LED2, RESET] {
        assert!(!sim.is_owned(line), "{line} still owned");
        assert!(!sim.is_bound(line), "{line} still bound");
    }
    assert!(!sim.acquisition_history().contains(&RESET));
    assert_eq!(sim.double_releases(), 0);
    assert!(!system.is_active());
}

#[test]
fn scenario_c_reset_while_idle() {
    let (sim, mut system) = stock_system();
    system.init().expect("init");

    assert!(sim.press(RESET));
    assert_eq!(sim.level(LED1), Some(false));
    assert_eq!(sim.level(LED2), Some(false));
    assert_eq!(system.latch().state(), LatchState::Idle);
}

#[test]
fn concurrent_presses_light_exactly_one_led() {
    const BUZZERS: u32 = 8;

    for _ in 0..50 {
        let (sim, mut system) = system_with(panel(BUZZERS));
        system.init().expect("init");

        let barrier = Arc::new(Barrier::new(BUZZERS as usize));
        let handles: Vec<_> = (0..BUZZERS)
            .map(|i| {
                let sim = Arc::clone(&sim);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    sim.press(LineId(i))
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().expect("press thread"));
        }

        let lit: Vec<_> = (0..BUZZERS)
            .filter(|i| sim.level(LineId(20 + i)) == Some(true))
            .collect();
        assert_eq!(lit.len(), 1, "lit LEDs: {lit:?}");
        assert_eq!(system.winner(), Some(lit[0] as usize));
        assert_eq!(system.latch().state(), LatchState::Latched);
    }
}

#[test]
fn press_while_latched_changes_nothing() {
    let (sim, mut system) = stock_system();
    system.init().expect("init");
    sim.press(BTN2);

    let before = system.led_levels();
    for _ in 0..3 {
        sim.press(BTN1);
        sim.press(BTN2);
    }
    assert_eq!(system.led_levels(), before);
    assert_eq!(system.latch().state(), LatchState::Latched);
}

#[test]
fn reset_is_unconditional() {
    let (sim, mut system) = stock_system();
    system.init().expect("init");

    for presses in [vec![], vec![BTN1], vec![BTN2, BTN1], vec![RESET]] {
        for line in presses {
            sim.press(line);
        }
        sim.press(RESET);
        assert!(system.led_levels().iter().all(|(_, lit)| !lit));
        assert_eq!(system.latch().state(), LatchState::Idle);
    }
}

#[test]
fn partial_init_never_leaks() {
    let button_faults = [
        SimFault::Acquire,
        SimFault::Direction,
        SimFault::Expose,
        SimFault::InterruptSource,
        SimFault::Register,
    ];
    let led_faults = [SimFault::Acquire, SimFault::Direction, SimFault::Expose];

    let config = panel(3);
    let mut cases = Vec::new();
    for (idx, buzzer) in config.buzzers.iter().enumerate() {
        for fault in button_faults {
            cases.push((UnitId::Buzzer(idx), buzzer.button.line, fault));
        }
        for fault in led_faults {
            cases.push((UnitId::Buzzer(idx), buzzer.led.line, fault));
        }
    }
    for fault in button_faults {
        cases.push((UnitId::Reset, config.reset.button.line, fault));
    }

    for (unit, line, fault) in cases {
        let (sim, mut system) = system_with(config.clone());
        sim.inject_fault(line, fault);

        let err = system.init().unwrap_err();
        let expected_code = match fault {
            SimFault::Acquire | SimFault::Register => -libc::EBUSY,
            SimFault::Direction | SimFault::Expose => -libc::EIO,
            SimFault::InterruptSource => -libc::ENXIO,
        };
        match &err {
            SystemError::Unit { unit: failed, source } => {
                assert_eq!(*failed, unit, "{fault:?} on {line}");
                assert_eq!(source.line(), line);
            }
            other => panic!("{fault:?} on {line}: unexpected {other:?}"),
        }
        assert_eq!(err.code(), expected_code, "{fault:?} on {line}");

        assert!(sim.owned_lines().is_empty(), "{fault:?} on {line} leaked");
        assert!(
            sim.acquisition_history()
                .iter()
                .all(|l| !sim.is_bound(*l) && !sim.is_exposed(*l))
        );
        if unit != UnitId::Reset {
            assert!(!sim.acquisition_history().contains(&config.reset.button.line));
        }
        assert_eq!(sim.double_releases(), 0);
        assert!(!system.is_active());
    }
}

#[test]
fn teardown_twice_is_clean() {
    let (sim, mut system) = stock_system();
    system.init().expect("init");
    sim.press(BTN1);

    system.teardown();
    system.teardown();

    assert!(!system.is_active());
    assert!(sim.owned_lines().is_empty());
    assert_eq!(sim.double_releases(), 0);
    assert!(!sim.press(BTN1));
    assert!(!sim.press(RESET));

    drop(system);
    assert_eq!(sim.double_releases(), 0);
}

#[test]
fn teardown_after_failed_init_is_noop() {
    let (sim, mut system) = stock_system();
    sim.inject_fault(BTN1, SimFault::Acquire);
    assert!(system.init().is_err());

    system.teardown();
    assert_eq!(sim.double_releases(), 0);
}

#[test]
fn rising_edge_configuration() {
    let config = SystemConfig {
        edge: Edge::Rising,
        ..SystemConfig::default()
    };
    let (sim, mut system) = system_with(config);
    system.init().expect("init");

    sim.press(BTN1);
    assert_eq!(sim.level(LED1), Some(false));
    sim.release_button(BTN1);
    assert_eq!(sim.level(LED1), Some(true));
}

#[test]
fn config_file_drives_registry_platform() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("buzzer.toml");
    std::fs::write(
        &path,
        r#"
platform = "simulation"
expose = false

[[buzzers]]
button = { line = 5, label = "left" }
led = { line = 6, label = "left led" }

[[buzzers]]
button = { line = 7, label = "right" }
led = { line = 8, label = "right led" }

[reset]
button = { line = 9, label = "host" }

[driver_config.simulation]
line_count = 16
"#,
    )
    .expect("write config");

    let config = BuzzerSystem::load_config(&path).expect("load");
    let mut system =
        BuzzerSystem::from_registry(config, &PlatformRegistry::with_builtin()).expect("system");
    system.init().expect("init");

    let platform = Arc::clone(system.platform());
    assert!(!platform.is_valid_line(LineId(16)));

    platform.handle_custom_command("press 7").expect("console");
    assert_eq!(
        system.led_levels(),
        vec![(LineId(6), false), (LineId(8), true)]
    );

    platform.handle_custom_command("press 9").expect("console");
    assert_eq!(system.winner(), None);

    let levels = platform.handle_custom_command("levels").expect("console");
    assert!(levels.contains("right led"));
}

#[test]
fn config_with_line_outside_platform_fails_with_enodev() {
    let mut config = SystemConfig::default();
    config.buzzers[1].led.line = LineId(60);
    let mut system =
        BuzzerSystem::from_registry(config, &PlatformRegistry::with_builtin()).expect("system");

    let err = system.init().unwrap_err();
    assert_eq!(err.code(), -libc::ENODEV);
}

#[derive(Debug, Clone, Copy)]
enum Event {
    Press(usize),
    Reset,
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => (0usize..3).prop_map(Event::Press),
        1 => Just(Event::Reset),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn press_reset_sequences_follow_latch_model(events in prop::collection::vec(event(), 0..40)) {
        let config = panel(3);
        let (sim, mut system) = system_with(config.clone());
        system.init().expect("init");

        let mut winner: Option<usize> = None;
        for event in events {
            match event {
                Event::Press(idx) => {
                    sim.press(config.buzzers[idx].button.line);
                    if winner.is_none() {
                        winner = Some(idx);
                    }
                }
                Event::Reset => {
                    sim.press(config.reset.button.line);
                    winner = None;
                }
            }

            prop_assert_eq!(system.winner(), winner);
            for (idx, buzzer) in config.buzzers.iter().enumerate() {
                prop_assert_eq!(sim.level(buzzer.led.line), Some(winner == Some(idx)));
            }
            let expected = if winner.is_some() { LatchState::Latched } else { LatchState::Idle };
            prop_assert_eq!(system.latch().state(), expected);
        }
    }
}
