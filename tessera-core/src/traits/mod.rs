//! Domain trait definitions
//!
//! These contracts sit between the capability layer (pins, ADC channels)
//! and the control logic. Implementations live in `tessera-io` or in the
//! board integration crate.

pub mod heater;
pub mod probe;
pub mod sensor;

pub use heater::{HeaterChannel, HeaterState};
pub use probe::{Probe, ProbeError, ProbeOutcome};
pub use sensor::{SensorError, TemperatureSensor};
