//! Indicator unit: one button and the LED it lights.
//!
//! The first press after a reset lights this unit's LED; every other press
//! (here or on any other unit) is ignored until the reset unit clears the
//! shared latch.

use crate::error::LineResult;
use crate::latch::SharedLatch;
use crate::line::DigitalLine;
use buzz_common::gpio::config::BuzzerConfig;
use buzz_common::gpio::platform::{InterruptHandler, Platform};
use buzz_common::gpio::types::{Direction, Edge};
use std::sync::{Arc, Weak};
use tracing::{info, trace};

/// Non-owning reference to an indicator's LED, held by the reset unit.
pub type LedRef = Weak<DigitalLine>;

/// Press handler body.
///
/// Returns `true` if this press won the latch and lit `led`.
#[inline]
pub fn press(led: &DigitalLine, latch: &SharedLatch) -> bool {
    if latch.try_claim() {
        led.assert();
        trace!(line = led.id().0, "press won");
        true
    } else {
        false
    }
}

/// One button/LED pair.
#[derive(Debug)]
pub struct IndicatorUnit {
    button: DigitalLine,
    led: Arc<DigitalLine>,
    latch: Arc<SharedLatch>,
}

impl IndicatorUnit {
    /// Build the unit: button as input, LED as deasserted output, then the
    /// button's interrupt bound to the press handler.
    ///
    /// The LED is configured before the handler is bound, so a press can
    /// never see a half-built unit. On error, every line this call acquired
    /// has been released.
    pub fn init(
        platform: &Arc<dyn Platform>,
        config: &BuzzerConfig,
        latch: Arc<SharedLatch>,
        expose: bool,
        edge: Edge,
    ) -> LineResult<Self> {
        let button = DigitalLine::acquire_and_configure(
            platform,
            config.button.line,
            &config.button.label,
            Direction::Input,
            expose,
        )?;
        let led = Arc::new(DigitalLine::acquire_and_configure(
            platform,
            config.led.line,
            &config.led.label,
            Direction::Output,
            expose,
        )?);

        let handler: InterruptHandler = {
            let led = Arc::clone(&led);
            let latch = Arc::clone(&latch);
            Arc::new(move || {
                press(&led, &latch);
            })
        };
        let button = button.bind_interrupt(edge, handler)?;

        info!(
            "Buzzer '{}' ({}) drives '{}' ({})",
            button.label(),
            button.id(),
            led.label(),
            led.id()
        );
        Ok(Self { button, led, latch })
    }

    /// Release the button (unbinding its handler) and then the LED.
    pub fn release(&mut self) {
        self.button.release();
        self.led.release();
    }

    /// Non-owning reference to the LED.
    pub fn led_ref(&self) -> LedRef {
        Arc::downgrade(&self.led)
    }

    /// The LED line.
    pub fn led(&self) -> &DigitalLine {
        &self.led
    }

    /// The button line.
    pub fn button(&self) -> &DigitalLine {
        &self.button
    }

    /// Whether this unit won the current round.
    pub fn is_winner(&self) -> bool {
        self.latch.is_latched() && self.led.is_asserted()
    }
}

impl Drop for IndicatorUnit {
    fn drop(&mut self) {
        self.release();
    }
}
