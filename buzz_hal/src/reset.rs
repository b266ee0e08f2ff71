//! Reset unit: one button that turns every indicator LED off and re-arms
//! the latch.

use crate::buzzer::LedRef;
use crate::error::LineResult;
use crate::latch::SharedLatch;
use crate::line::DigitalLine;
use buzz_common::consts::MAX_BUZZERS;
use buzz_common::gpio::config::ResetConfig;
use buzz_common::gpio::platform::{InterruptHandler, Platform};
use buzz_common::gpio::types::{Direction, Edge};
use std::sync::Arc;
use tracing::{info, trace};

/// Fixed-capacity list of LED references; entries may be absent.
pub type LedRefs = heapless::Vec<Option<LedRef>, MAX_BUZZERS>;

/// Reset handler body: deassert every present LED, then clear the latch.
///
/// Absent or already dropped LEDs are skipped. The latch is cleared even
/// when it was idle.
#[inline]
pub fn reset_all(leds: &[Option<LedRef>], latch: &SharedLatch) {
    for led in leds.iter().flatten() {
        if let Some(led) = led.upgrade() {
            led.deassert();
        }
    }
    latch.clear();
    trace!("reset");
}

/// The reset button.
#[derive(Debug)]
pub struct ResetUnit {
    button: DigitalLine,
    leds: Arc<LedRefs>,
    latch: Arc<SharedLatch>,
}

impl ResetUnit {
    /// Build the unit and bind its handler over `leds`.
    ///
    /// The unit does not own the LEDs. On error its button has been released.
    pub fn init(
        platform: &Arc<dyn Platform>,
        config: &ResetConfig,
        leds: LedRefs,
        latch: Arc<SharedLatch>,
        expose: bool,
        edge: Edge,
    ) -> LineResult<Self> {
        let leds = Arc::new(leds);
        let handler: InterruptHandler = {
            let leds = Arc::clone(&leds);
            let latch = Arc::clone(&latch);
            Arc::new(move || reset_all(&leds, &latch))
        };

        let button = DigitalLine::acquire_and_configure(
            platform,
            config.button.line,
            &config.button.label,
            Direction::Input,
            expose,
        )?
        .bind_interrupt(edge, handler)?;

        info!(
            "Reset '{}' ({}) covers {} LEDs",
            button.label(),
            button.id(),
            leds.iter().flatten().count()
        );
        Ok(Self {
            button,
            leds,
            latch,
        })
    }

    /// Run the reset action directly, as a press would.
    pub fn trigger(&self) {
        reset_all(&self.leds, &self.latch);
    }

    /// Release the button. LEDs are left to their owners.
    pub fn release(&mut self) {
        self.button.release();
    }

    /// The button line.
    pub fn button(&self) -> &DigitalLine {
        &self.button
    }

    /// Number of LED slots, present or not.
    pub fn led_slots(&self) -> usize {
        self.leds.len()
    }
}

impl Drop for ResetUnit {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::{SimFault, SimulationPlatform};
    use crate::error::LineError;
    use buzz_common::gpio::config::LineConfig;
    use buzz_common::gpio::types::LineId;
    use std::sync::Weak;

    fn platform() -> (Arc<SimulationPlatform>, Arc<dyn Platform>) {
        let sim = Arc::new(SimulationPlatform::new());
        let dynamic: Arc<dyn Platform> = sim.clone();
        (sim, dynamic)
    }

    fn reset_config() -> ResetConfig {
        ResetConfig {
            button: LineConfig::new(26, "reset button"),
        }
    }

    fn led(platform: &Arc<dyn Platform>, line: u32) -> Arc<DigitalLine> {
        Arc::new(
            DigitalLine::acquire_and_configure(platform, LineId(line), "led", Direction::Output, true)
                .expect("led"),
        )
    }

    #[test]
    fn test_reset_turns_off_every_led_and_clears() {
        let (sim, platform) = platform();
        let latch = Arc::new(SharedLatch::new());
        let blue = led(&platform, 24);
        let red = led(&platform, 25);

        let mut leds = LedRefs::new();
        leds.push(Some(Arc::downgrade(&blue))).unwrap();
        leds.push(Some(Arc::downgrade(&red))).unwrap();
        let _reset = ResetUnit::init(
            &platform,
            &reset_config(),
            leds,
            Arc::clone(&latch),
            true,
            Edge::Falling,
        )
        .expect("init");

        blue.assert();
        red.assert();
        latch.try_claim();
        assert!(sim.press(LineId(26)));

        assert_eq!(sim.level(LineId(24)), Some(false));
        assert_eq!(sim.level(LineId(25)), Some(false));
        assert!(!latch.is_latched());
    }

    #[test]
    fn test_absent_and_dropped_refs_are_skipped() {
        let (sim, platform) = platform();
        let latch = Arc::new(SharedLatch::new());
        let blue = led(&platform, 24);

        let mut leds = LedRefs::new();
        leds.push(None).unwrap();
        leds.push(Some(Weak::new())).unwrap();
        leds.push(Some(Arc::downgrade(&blue))).unwrap();
        let reset = ResetUnit::init(
            &platform,
            &reset_config(),
            leds,
            Arc::clone(&latch),
            false,
            Edge::Falling,
        )
        .expect("init");
        assert_eq!(reset.led_slots(), 3);

        blue.assert();
        latch.try_claim();
        reset.trigger();
        assert_eq!(sim.level(LineId(24)), Some(false));
        assert!(!latch.is_latched());
    }

    #[test]
    fn test_reset_when_idle_is_harmless() {
        let latch = SharedLatch::new();
        reset_all(&[], &latch);
        assert!(!latch.is_latched());
    }

    #[test]
    fn test_release_leaves_leds_owned() {
        let (sim, platform) = platform();
        let blue = led(&platform, 24);
        let mut leds = LedRefs::new();
        leds.push(Some(Arc::downgrade(&blue))).unwrap();

        let mut reset = ResetUnit::init(
            &platform,
            &reset_config(),
            leds,
            Arc::new(SharedLatch::new()),
            true,
            Edge::Falling,
        )
        .expect("init");
        reset.release();

        assert!(!sim.is_owned(LineId(26)));
        assert!(!sim.is_bound(LineId(26)));
        assert!(sim.is_owned(LineId(24)));
    }

    #[test]
    fn test_bind_failure_releases_button() {
        let (sim, platform) = platform();
        sim.inject_fault(LineId(26), SimFault::InterruptSource);
        let err = ResetUnit::init(
            &platform,
            &reset_config(),
            LedRefs::new(),
            Arc::new(SharedLatch::new()),
            true,
            Edge::Falling,
        )
        .unwrap_err();
        assert!(matches!(err, LineError::NoInterruptSource { .. }));
        assert!(sim.owned_lines().is_empty());
    }
}
