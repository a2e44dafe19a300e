//! Machine context
//!
//! Owns every heater channel, the leveling engine, and the tool table.
//! Two entry points exist: [`Machine::on_timer_tick`] runs in the periodic
//! timer interrupt and drives PWM edges plus the divided control loop;
//! [`Machine::dispatch`] runs in the cooperative command context and
//! handles structured commands from the G-code layer.

use heapless::Vec;
use tessera_hal::KvStore;

use crate::config::{ConfigError, MachineConfig, MAX_HEATERS};
use crate::leveling::{LevelCommand, LevelReport, Leveling, LevelingError};
use crate::tool::{ToolError, ToolTable};
use crate::traits::{HeaterChannel, Probe};

/// Structured machine command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MachineCommand {
    /// Bed leveling (G32/G33/M323 family)
    Level(LevelCommand),
    /// M104/M140: set a heater target in degrees Celsius
    SetHeaterTarget { heater: u8, celsius: f32 },
    /// Clear a terminal heater fault after operator inspection
    ResetHeaterFault { heater: u8 },
    /// T0..Tn: switch the active tool
    SelectTool(u8),
}

/// Structured response to a machine command
#[derive(Debug, Clone, PartialEq)]
pub enum MachineReport {
    Level(LevelReport),
    ToolSelected(u8),
    Ok,
}

/// Dispatch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MachineError {
    Leveling(LevelingError),
    Tool(ToolError),
    NoSuchHeater(u8),
}

impl From<LevelingError> for MachineError {
    fn from(err: LevelingError) -> Self {
        MachineError::Leveling(err)
    }
}

impl From<ToolError> for MachineError {
    fn from(err: ToolError) -> Self {
        MachineError::Tool(err)
    }
}

/// The assembled machine
pub struct Machine<H> {
    heaters: Vec<H, MAX_HEATERS>,
    leveling: Leveling,
    tools: ToolTable,
    control_divider: u32,
    tick: u32,
}

impl<H: HeaterChannel> Machine<H> {
    /// Assemble a machine from validated configuration and constructed
    /// channels
    pub fn new(
        config: &MachineConfig,
        heaters: Vec<H, MAX_HEATERS>,
        leveling: Leveling,
        tools: ToolTable,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            heaters,
            leveling,
            tools,
            control_divider: config.control_divider.max(1),
            tick: 0,
        })
    }

    /// The leveling engine (motion layer reads corrections from here)
    pub fn leveling(&self) -> &Leveling {
        &self.leveling
    }

    /// The tool table
    pub fn tools(&self) -> &ToolTable {
        &self.tools
    }

    /// One heater channel by index
    pub fn heater(&self, index: u8) -> Option<&H> {
        self.heaters.get(usize::from(index))
    }

    fn heater_mut(&mut self, index: u8) -> Result<&mut H, MachineError> {
        self.heaters
            .get_mut(usize::from(index))
            .ok_or(MachineError::NoSuchHeater(index))
    }

    /// Restore persisted calibration on boot; absent keys keep defaults
    pub fn init_from_store<K: KvStore>(&mut self, store: &mut K) -> Result<(), LevelingError> {
        self.leveling.init_from_store(store)
    }

    /// Timer interrupt entry point
    ///
    /// Every call advances the PWM time base of every heater; every
    /// `control_divider`-th call also runs the full control pipeline.
    pub fn on_timer_tick(&mut self, now_ms: u32) {
        for heater in self.heaters.iter_mut() {
            heater.pwm_tick();
        }
        self.tick = self.tick.wrapping_add(1);
        if self.tick % self.control_divider == 0 {
            for heater in self.heaters.iter_mut() {
                heater.control_tick(now_ms);
            }
        }
    }

    /// True when the active tool either has no heater or its heater is
    /// within tolerance of a nonzero target. Gates extrusion moves.
    pub fn active_tool_ready(&self) -> bool {
        match self.tools.active().heater {
            None => true,
            Some(index) => self
                .heater(index)
                .is_some_and(|h| h.is_at_operating_temperature()),
        }
    }

    /// Command context entry point
    pub fn dispatch<P: Probe, K: KvStore>(
        &mut self,
        cmd: MachineCommand,
        probe: &mut P,
        store: &mut K,
    ) -> Result<MachineReport, MachineError> {
        match cmd {
            MachineCommand::Level(level) => {
                let report = self.leveling.execute(level, probe, store)?;
                Ok(MachineReport::Level(report))
            }
            MachineCommand::SetHeaterTarget { heater, celsius } => {
                self.heater_mut(heater)?.set_target(celsius);
                Ok(MachineReport::Ok)
            }
            MachineCommand::ResetHeaterFault { heater } => {
                self.heater_mut(heater)?.reset_fault();
                Ok(MachineReport::Ok)
            }
            MachineCommand::SelectTool(index) => {
                self.tools.select(index)?;
                Ok(MachineReport::ToolSelected(index))
            }
        }
    }
}
