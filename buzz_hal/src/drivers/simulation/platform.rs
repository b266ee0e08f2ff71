//! Simulation platform implementation.
//!
//! The `SimulationPlatform` implements the `Platform` trait entirely in
//! process: a bank of atomic line slots, an interrupt registration table,
//! per-line fault injection, and stimulus methods (`press`,
//! `release_button`) that play the role of the hardware edge detector.

use super::bank::LineBank;
use super::config::{SimFault, SimulationConfig};
use buzz_common::consts::SIM_IRQ_BASE;
use buzz_common::gpio::config::SystemConfig;
use buzz_common::gpio::platform::{InterruptHandler, Platform, PlatformError};
use buzz_common::gpio::types::{Direction, Edge, InterruptId, LineHandle, LineId};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, trace, warn};

/// Live interrupt registration.
struct Registration {
    edge: Edge,
    handler: InterruptHandler,
}

/// In-process GPIO controller.
pub struct SimulationPlatform {
    /// Platform name
    name: &'static str,
    /// Platform version
    version: &'static str,
    /// Line slots
    bank: LineBank,
    /// Labels of owned lines
    labels: Mutex<HashMap<u32, String>>,
    /// Injected failures
    faults: Mutex<HashSet<(u32, SimFault)>>,
    /// Every successful acquisition, in order
    acquisitions: Mutex<Vec<LineId>>,
    /// Interrupt table. Held for reading while a handler runs.
    registrations: RwLock<HashMap<InterruptId, Registration>>,
    /// Releases of lines that were not owned
    double_releases: AtomicU64,
}

impl SimulationPlatform {
    /// Create a simulation platform with default settings.
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Create a simulation platform from explicit settings.
    pub fn with_config(config: SimulationConfig) -> Self {
        let platform = Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            bank: LineBank::new(config.line_count),
            labels: Mutex::new(HashMap::new()),
            faults: Mutex::new(HashSet::new()),
            acquisitions: Mutex::new(Vec::new()),
            registrations: RwLock::new(HashMap::new()),
            double_releases: AtomicU64::new(0),
        };
        platform.apply_faults(&config);
        platform
    }

    fn apply_faults(&self, config: &SimulationConfig) {
        let mut faults = self.faults.lock();
        faults.clear();
        faults.extend(
            config
                .no_interrupt_lines
                .iter()
                .map(|line| (*line, SimFault::InterruptSource)),
        );
        faults.extend(config.faults.iter().map(|f| (f.line, f.op)));
    }

    /// Make `fault` fail for `line` from now on.
    pub fn inject_fault(&self, line: LineId, fault: SimFault) {
        debug!("Injecting {:?} fault on {}", fault, line);
        self.faults.lock().insert((line.0, fault));
    }

    /// Remove every injected fault.
    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    fn check_fault(&self, line: u32, fault: SimFault) -> Result<(), PlatformError> {
        if self.faults.lock().contains(&(line, fault)) {
            warn!("Injected {:?} fault on GPIO {}", fault, line);
            return Err(PlatformError::Io(format!(
                "injected {fault:?} fault on GPIO {line}"
            )));
        }
        Ok(())
    }

    fn owned_slot(&self, handle: LineHandle) -> Result<&super::bank::LineSlot, PlatformError> {
        self.bank
            .get(handle.raw())
            .filter(|slot| slot.is_owned())
            .ok_or(PlatformError::UnknownHandle(handle.raw()))
    }

    fn irq_for(line: u32) -> InterruptId {
        InterruptId(SIM_IRQ_BASE + line)
    }

    /// Drive an edge on an owned input line and run its handler if the
    /// registration matches. Returns whether a handler ran.
    pub fn fire(&self, line: LineId, transition: Edge) -> bool {
        let Some(slot) = self.bank.get(line.0) else {
            return false;
        };
        if !slot.is_owned() || slot.is_output() {
            trace!("Edge on {} ignored: not an owned input", line);
            return false;
        }
        slot.set_level(transition == Edge::Rising);

        let registrations = self.registrations.read();
        match registrations.get(&Self::irq_for(line.0)) {
            Some(reg) if reg.edge.triggers_on(transition) => {
                (reg.handler)();
                true
            }
            _ => false,
        }
    }

    /// Button press: falling edge, line pulled low.
    pub fn press(&self, line: LineId) -> bool {
        self.fire(line, Edge::Falling)
    }

    /// Button release: rising edge, line back high.
    pub fn release_button(&self, line: LineId) -> bool {
        self.fire(line, Edge::Rising)
    }

    /// Level of an owned line, `None` if not owned.
    pub fn level(&self, line: LineId) -> Option<bool> {
        self.bank
            .get(line.0)
            .filter(|slot| slot.is_owned())
            .map(|slot| slot.level())
    }

    /// Whether the line is currently owned.
    pub fn is_owned(&self, line: LineId) -> bool {
        self.bank.get(line.0).is_some_and(|slot| slot.is_owned())
    }

    /// Whether the line is currently exposed.
    pub fn is_exposed(&self, line: LineId) -> bool {
        self.bank.get(line.0).is_some_and(|slot| slot.is_exposed())
    }

    /// Whether a handler is registered for the line's interrupt.
    pub fn is_bound(&self, line: LineId) -> bool {
        self.registrations.read().contains_key(&Self::irq_for(line.0))
    }

    /// Label recorded at acquisition.
    pub fn label(&self, line: LineId) -> Option<String> {
        self.labels.lock().get(&line.0).cloned()
    }

    /// All owned lines, ascending.
    pub fn owned_lines(&self) -> Vec<LineId> {
        self.bank.owned().map(LineId).collect()
    }

    /// Every line ever acquired, in acquisition order.
    pub fn acquisition_history(&self) -> Vec<LineId> {
        self.acquisitions.lock().clone()
    }

    /// Number of `release_line` calls on lines that were not owned.
    pub fn double_releases(&self) -> u64 {
        self.double_releases.load(Ordering::SeqCst)
    }

    fn describe_levels(&self) -> String {
        let labels = self.labels.lock();
        let mut out = String::new();
        for line in self.bank.owned() {
            let Some(slot) = self.bank.get(line) else {
                continue;
            };
            let _ = writeln!(
                out,
                "GPIO {:>2} {:<6} {} '{}'",
                line,
                if slot.is_output() { "output" } else { "input" },
                if slot.level() { "high" } else { "low" },
                labels.get(&line).map(String::as_str).unwrap_or("")
            );
        }
        if out.is_empty() {
            out.push_str("no lines owned\n");
        }
        out
    }
}

impl Default for SimulationPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SimulationPlatform {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, config: &SystemConfig) -> Result<(), PlatformError> {
        let sim = SimulationConfig::from_section(config.driver_section(self.name))?;
        if self.bank.owned().next().is_some() {
            return Err(PlatformError::InitFailed(
                "cannot re-initialize while lines are owned".to_string(),
            ));
        }
        self.bank = LineBank::new(sim.line_count);
        self.apply_faults(&sim);
        info!(
            "Simulation platform initialized: {} lines, {} faults",
            sim.line_count,
            self.faults.lock().len()
        );
        Ok(())
    }

    fn is_valid_line(&self, id: LineId) -> bool {
        id.0 < self.bank.len()
    }

    fn acquire_line(&self, id: LineId, label: &str) -> Result<LineHandle, PlatformError> {
        let slot = self
            .bank
            .get(id.0)
            .ok_or(PlatformError::UnknownHandle(id.0))?;
        self.check_fault(id.0, SimFault::Acquire)?;
        if !slot.claim() {
            let owner = self.label(id).unwrap_or_default();
            return Err(PlatformError::Busy(format!("{id} owned by '{owner}'")));
        }
        self.labels.lock().insert(id.0, label.to_string());
        self.acquisitions.lock().push(id);
        trace!("Acquired {} for '{}'", id, label);
        Ok(LineHandle::new(id.0))
    }

    fn release_line(&self, handle: LineHandle) {
        let Some(slot) = self.bank.get(handle.raw()) else {
            warn!("Release of unknown handle {}", handle.raw());
            self.double_releases.fetch_add(1, Ordering::SeqCst);
            return;
        };
        if !slot.free() {
            warn!("GPIO {} released while not owned", handle.raw());
            self.double_releases.fetch_add(1, Ordering::SeqCst);
            return;
        }
        self.labels.lock().remove(&handle.raw());
        trace!("Released GPIO {}", handle.raw());
    }

    fn set_direction(&self, handle: LineHandle, direction: Direction) -> Result<(), PlatformError> {
        let slot = self.owned_slot(handle)?;
        self.check_fault(handle.raw(), SimFault::Direction)?;
        slot.set_output(direction == Direction::Output);
        Ok(())
    }

    fn set_level(&self, handle: LineHandle, high: bool) {
        match self.bank.get(handle.raw()) {
            Some(slot) if slot.is_owned() && slot.is_output() => slot.set_level(high),
            _ => trace!("set_level on GPIO {} ignored", handle.raw()),
        }
    }

    fn expose_externally(&self, handle: LineHandle, writable: bool) -> Result<(), PlatformError> {
        let slot = self.owned_slot(handle)?;
        self.check_fault(handle.raw(), SimFault::Expose)?;
        slot.set_exposed(true);
        trace!("Exposed GPIO {} (direction writable: {})", handle.raw(), writable);
        Ok(())
    }

    fn withdraw_exposure(&self, handle: LineHandle) {
        if let Some(slot) = self.bank.get(handle.raw()) {
            slot.set_exposed(false);
        }
    }

    fn line_to_interrupt_source(&self, handle: LineHandle) -> Result<InterruptId, PlatformError> {
        let slot = self.owned_slot(handle)?;
        if slot.is_output() {
            return Err(PlatformError::Unsupported(format!(
                "GPIO {} is an output",
                handle.raw()
            )));
        }
        self.check_fault(handle.raw(), SimFault::InterruptSource)?;
        Ok(Self::irq_for(handle.raw()))
    }

    fn bind_interrupt(
        &self,
        irq: InterruptId,
        edge: Edge,
        handler: InterruptHandler,
    ) -> Result<(), PlatformError> {
        let line = irq.0.checked_sub(SIM_IRQ_BASE).ok_or_else(|| {
            PlatformError::Unsupported(format!("{irq} is not a simulated line interrupt"))
        })?;
        self.check_fault(line, SimFault::Register)?;

        let mut registrations = self.registrations.write();
        if registrations.contains_key(&irq) {
            return Err(PlatformError::Busy(format!("{irq} already requested")));
        }
        registrations.insert(irq, Registration { edge, handler });
        debug!("Bound {} ({} edge) for GPIO {}", irq, edge, line);
        Ok(())
    }

    fn unbind_interrupt(&self, irq: InterruptId) {
        if self.registrations.write().remove(&irq).is_none() {
            warn!("Unbind of {} which was not bound", irq);
        }
    }

    fn handle_custom_command(&self, command: &str) -> Option<String> {
        let mut words = command.split_whitespace();
        let verb = words.next()?;
        let arg = words.next().map(str::parse::<u32>);

        let reply = match (verb, arg) {
            ("press", Some(Ok(line))) => {
                format!("press GPIO {line}: handler ran = {}\n", self.press(LineId(line)))
            }
            ("release", Some(Ok(line))) => format!(
                "release GPIO {line}: handler ran = {}\n",
                self.release_button(LineId(line))
            ),
            ("press" | "release", _) => format!("usage: {verb} <line>\n"),
            ("levels", None) => self.describe_levels(),
            ("owned", None) => format!("{:?}\n", self.owned_lines()),
            ("help", None) => "commands: press <line>, release <line>, levels, owned\n".to_string(),
            _ => return None,
        };
        Some(reply)
    }
}
