//! Temperature sensor trait

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted to ground
    ShortCircuit,
    /// Reading out of expected range
    OutOfRange,
    /// ADC conversion error
    ConversionError,
}

/// Trait for temperature sensors
///
/// Implementations own the analog capability and calibration table and
/// deliver a smoothed reading in degrees Celsius. Readings outside the
/// calibration table clamp to the nearest endpoint; genuine electrical
/// faults surface as errors.
///
/// Takes `&mut self` because ADC reads typically require mutable access.
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    fn read_celsius(&mut self) -> Result<f32, SensorError>;

    /// Check if the sensor reading is valid
    fn is_valid(&mut self) -> bool {
        self.read_celsius().is_ok()
    }
}
