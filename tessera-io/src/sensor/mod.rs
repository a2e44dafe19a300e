//! Temperature sensing
//!
//! ADC-backed thermistor sensing: a shared conversion-table interpolator
//! plus the sensor driver that owns one analog channel, oversamples it,
//! and maps rail readings to wiring faults.

mod table;

pub use table::{ConversionTable, TableSensor, NTC100K_B3950};
